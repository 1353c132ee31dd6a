// geodex\crates\gx_foundation\src/float.rs

//! 浮点数比较与数值格式化
//!
//! 坐标操作管线字符串需要逐位稳定的数值文本：同一个数值在任何平台上
//! 都必须输出同样的字符。本模块提供与 C `%.15g` 一致的格式化，
//! 以及管线输出前的"十分位吸附"规则。
//!
//! # 示例
//!
//! ```
//! use gx_foundation::float::format_number;
//!
//! assert_eq!(format_number(0.9996), "0.9996");
//! assert_eq!(format_number(500000.0), "500000");
//! assert_eq!(format_number(2.5969213), "2.5969213");
//! ```

// ============================================================================
// 数值常量
// ============================================================================

/// 浮点数相等性比较的默认容差
pub const DEFAULT_EPSILON: f64 = 1e-14;

/// 十分位吸附阈值
pub const SNAP_TENTH_EPSILON: f64 = 1e-8;

/// 输出有效数字位数
pub const SIGNIFICANT_DIGITS: usize = 15;

// ============================================================================
// 比较
// ============================================================================

/// 绝对容差比较
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// 相对容差比较（以较大者的量级为基准，零附近退化为绝对容差）
#[inline]
pub fn approx_eq_rel(a: f64, b: f64, rel: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= rel * scale
}

// ============================================================================
// 格式化
// ============================================================================

/// 把接近十分位的值吸附到十分位
///
/// `|10v - round(10v)| < 1e-8` 时返回 `round(10v) / 10`，否则原样返回。
#[inline]
pub fn snap_to_tenth(value: f64) -> f64 {
    let scaled = value * 10.0;
    let rounded = scaled.round();
    if (scaled - rounded).abs() < SNAP_TENTH_EPSILON {
        rounded / 10.0
    } else {
        value
    }
}

/// 按 C `printf("%.15g")` 的规则格式化
///
/// 指数小于 -4 或不小于 15 时使用科学计数法，否则使用定点表示；
/// 两种形式都去掉尾随零。
pub fn format_g15(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let precision = SIGNIFICANT_DIGITS - 1;
    let sci = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let mantissa = strip_trailing_zeros(&mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let decimals = (precision as i32 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value))
    }
}

/// 管线参数值格式化：先吸附十分位，再 `%.15g`
pub fn format_number(value: f64) -> String {
    format_g15(snap_to_tenth(value))
}

fn strip_trailing_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    let trimmed = text.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

// ============================================================================
// 测试
// ============================================================================
