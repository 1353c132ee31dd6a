// geodex\crates\gx_geo\src\pipeline.rs
//! 管线字符串格式化器
//!
//! 坐标操作被渲染为有序的步骤序列，每步带名称、是否取逆和 `k=v` 参数。
//! 渲染前运行化简器，消去相互抵消的单位转换、轴交换、Helmert 与
//! push/pop 步骤，使同一逻辑管线总是得到同一字符串。
//!
//! # 输出规则
//!
//! - 多于一步或单个取逆步骤时输出 `+proj=pipeline`，后续每步前缀 `+step`
//! - 取逆步骤输出 `+inv +proj=name`
//! - 空管线输出 `+proj=noop`
//!
//! # 示例
//!
//! ```
//! use gx_geo::pipeline::PipelineFormatter;
//!
//! let mut f = PipelineFormatter::new();
//! f.add_step("axisswap");
//! f.add_param("order", "2,1");
//! f.add_step("unitconvert");
//! f.add_param("xy_in", "deg");
//! f.add_param("xy_out", "rad");
//! assert_eq!(
//!     f.to_pipeline_string(),
//!     "+proj=pipeline +step +proj=axisswap +order=2,1 +step +proj=unitconvert +xy_in=deg +xy_out=rad"
//! );
//! ```

use gx_foundation::float::format_number;
use serde::{Deserialize, Serialize};

/// 输出约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Convention {
    /// 管线约定（支持全部操作）
    #[default]
    Proj5,
    /// 旧式约定：不能表达基准变换
    Proj4,
}

#[derive(Debug, Clone, PartialEq)]
struct StepParam {
    key: String,
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    name: String,
    inverted: bool,
    params: Vec<StepParam>,
}

impl Step {
    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .and_then(|p| p.value.as_deref())
    }

    fn is_swap_2_1(&self) -> bool {
        self.name == "axisswap"
            && self.params.len() == 1
            && self.param("order") == Some("2,1")
    }

    fn is_v3(&self, name: &str) -> bool {
        self.name == name
            && !self.inverted
            && self.params.len() == 1
            && self.params[0].key == "v_3"
    }
}

const UNIT_KEYS: [&str; 6] = ["xy_in", "xy_out", "z_in", "z_out", "t_in", "t_out"];

/// 管线格式化器
#[derive(Debug, Clone, Default)]
pub struct PipelineFormatter {
    convention: Convention,
    crs_export: bool,
    steps: Vec<Step>,
    inversion_stack: Vec<usize>,
    omit_longlat: bool,
    omit_z_stack: Vec<bool>,
    towgs84: Option<Vec<f64>>,
    nadgrids: Option<String>,
}

impl PipelineFormatter {
    /// 操作导出用格式化器
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定约定
    pub fn with_convention(convention: Convention) -> Self {
        Self {
            convention,
            ..Self::default()
        }
    }

    /// CRS 导出用格式化器（`+type=crs` 形式）
    pub fn for_crs(convention: Convention) -> Self {
        Self {
            convention,
            crs_export: true,
            ..Self::default()
        }
    }

    /// 输出约定
    #[inline]
    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// 是否为 CRS 导出模式
    #[inline]
    pub fn is_crs_export(&self) -> bool {
        self.crs_export
    }

    // ========================================================================
    // 步骤与参数
    // ========================================================================

    /// 追加步骤
    pub fn add_step(&mut self, name: &str) {
        self.steps.push(Step {
            name: name.to_string(),
            inverted: false,
            params: Vec::new(),
        });
    }

    /// 设置当前步骤是否取逆
    pub fn set_current_step_inverted(&mut self, inverted: bool) {
        if let Some(step) = self.steps.last_mut() {
            step.inverted = inverted;
        }
    }

    fn push_param(&mut self, key: &str, value: Option<String>) {
        if self.steps.is_empty() {
            // 垂直 CRS 只有参数没有步骤名
            self.add_step("");
        }
        if let Some(step) = self.steps.last_mut() {
            step.params.push(StepParam {
                key: key.to_string(),
                value,
            });
        }
    }

    /// 无值参数（如 `+south`）
    pub fn add_param_flag(&mut self, key: &str) {
        self.push_param(key, None);
    }

    /// 文本参数
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.push_param(key, Some(value.to_string()));
    }

    /// 数值参数
    pub fn add_param_num(&mut self, key: &str, value: f64) {
        self.push_param(key, Some(format_number(value)));
    }

    /// 整数参数
    pub fn add_param_int(&mut self, key: &str, value: i64) {
        self.push_param(key, Some(value.to_string()));
    }

    /// 数组参数（逗号连接）
    pub fn add_param_nums(&mut self, key: &str, values: &[f64]) {
        let joined = values
            .iter()
            .map(|v| format_number(*v))
            .collect::<Vec<_>>()
            .join(",");
        self.push_param(key, Some(joined));
    }

    // ========================================================================
    // 取逆区间
    // ========================================================================

    /// 开始取逆区间
    pub fn start_inversion(&mut self) {
        self.inversion_stack.push(self.steps.len());
    }

    /// 结束取逆区间：区间内步骤取逆并反序
    pub fn stop_inversion(&mut self) {
        let Some(start) = self.inversion_stack.pop() else {
            return;
        };
        let range = &mut self.steps[start..];
        for step in range.iter_mut() {
            match step.name.as_str() {
                "push" => step.name = "pop".to_string(),
                "pop" => step.name = "push".to_string(),
                _ => step.inverted = !step.inverted,
            }
        }
        range.reverse();
    }

    // ========================================================================
    // 导出状态
    // ========================================================================

    /// 是否在子午线为 0 时省略 `longlat`
    #[inline]
    pub fn omit_longlat(&self) -> bool {
        self.omit_longlat
    }

    /// 设置省略 `longlat`
    pub fn set_omit_longlat(&mut self, omit: bool) {
        self.omit_longlat = omit;
    }

    /// 压入"省略 z 单位转换"状态
    pub fn push_omit_z(&mut self, omit: bool) {
        self.omit_z_stack.push(omit);
    }

    /// 弹出"省略 z 单位转换"状态
    pub fn pop_omit_z(&mut self) {
        self.omit_z_stack.pop();
    }

    /// 当前是否省略 z 单位转换
    #[inline]
    pub fn omit_z(&self) -> bool {
        self.omit_z_stack.last().copied().unwrap_or(false)
    }

    /// 设置 CRS 导出时附带的 `towgs84` 参数
    pub fn set_towgs84(&mut self, values: Option<Vec<f64>>) {
        self.towgs84 = values;
    }

    /// `towgs84` 参数
    pub fn towgs84(&self) -> Option<&[f64]> {
        self.towgs84.as_deref()
    }

    /// 设置 CRS 导出时附带的 `nadgrids` 参数
    pub fn set_nadgrids(&mut self, grid: Option<String>) {
        self.nadgrids = grid;
    }

    /// `nadgrids` 参数
    pub fn nadgrids(&self) -> Option<&str> {
        self.nadgrids.as_deref()
    }

    // ========================================================================
    // 渲染
    // ========================================================================

    /// 化简并渲染为管线字符串
    pub fn to_pipeline_string(&self) -> String {
        let steps = optimize(self.steps.clone());
        render(&steps)
    }
}

// ============================================================================
// 化简
// ============================================================================

/// 取逆的单位转换改写为正向交换形式，`axisswap order=2,1` 自逆
fn normalize(steps: &mut [Step]) {
    for step in steps.iter_mut() {
        if !step.inverted {
            continue;
        }
        if step.name == "unitconvert"
            && step.params.iter().all(|p| UNIT_KEYS.contains(&p.key.as_str()))
        {
            let mut swapped = Vec::with_capacity(step.params.len());
            for (key, from) in [
                ("xy_in", "xy_out"),
                ("z_in", "z_out"),
                ("t_in", "t_out"),
                ("xy_out", "xy_in"),
                ("z_out", "z_in"),
                ("t_out", "t_in"),
            ] {
                if let Some(value) = step.param(from) {
                    swapped.push(StepParam {
                        key: key.to_string(),
                        value: Some(value.to_string()),
                    });
                }
            }
            step.params = swapped;
            step.inverted = false;
        } else if step.is_swap_2_1() {
            step.inverted = false;
        }
    }
}

fn unit_converts_cancel(a: &Step, b: &Step) -> bool {
    if a.name != "unitconvert" || b.name != "unitconvert" || a.inverted || b.inverted {
        return false;
    }
    if a.params.len() != b.params.len() {
        return false;
    }
    if !a.params.iter().all(|p| UNIT_KEYS.contains(&p.key.as_str())) {
        return false;
    }
    if !a.params.iter().all(|p| b.params.iter().any(|q| q.key == p.key)) {
        return false;
    }
    [("xy_in", "xy_out"), ("z_in", "z_out"), ("t_in", "t_out")]
        .iter()
        .all(|(i, o)| a.param(i) == b.param(o) && a.param(o) == b.param(i))
}

fn helmerts_cancel(a: &Step, b: &Step) -> bool {
    if a.name != "helmert" || b.name != "helmert" || a.inverted || b.inverted {
        return false;
    }
    if a.params.len() != b.params.len() {
        return false;
    }
    a.params.iter().zip(&b.params).all(|(p, q)| {
        if p.key != q.key {
            return false;
        }
        match p.key.as_str() {
            "convention" | "t_epoch" | "t_obs" => p.value == q.value,
            _ => match (&p.value, &q.value) {
                (Some(x), Some(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
                    (Ok(x), Ok(y)) => (x + y).abs() <= 1e-12 * x.abs().max(1.0),
                    _ => false,
                },
                (None, None) => true,
                _ => false,
            },
        }
    })
}

/// 反复化简直到稳定
fn optimize(mut steps: Vec<Step>) -> Vec<Step> {
    normalize(&mut steps);
    loop {
        let mut changed = false;
        for i in 1..steps.len() {
            let cur = &steps[i];
            let prev = &steps[i - 1];

            // 中间的纯椭球 longlat 是恒等步骤
            if cur.name == "longlat"
                && cur.params.len() == 1
                && cur.params[0].key == "ellps"
                && i + 1 < steps.len()
            {
                steps.remove(i);
                changed = true;
                break;
            }

            let cancels = unit_converts_cancel(prev, cur)
                || (prev.is_swap_2_1() && cur.is_swap_2_1())
                || helmerts_cancel(prev, cur)
                || (prev.name == cur.name
                    && prev.params == cur.params
                    && prev.inverted != cur.inverted)
                || (prev.is_v3("pop") && cur.is_v3("push"))
                || (prev.is_v3("push") && cur.is_v3("pop"));
            if cancels {
                steps.drain(i - 1..=i);
                changed = true;
                break;
            }
        }
        if !changed {
            return steps;
        }
    }
}

fn render(steps: &[Step]) -> String {
    if steps.is_empty() {
        return "+proj=noop".to_string();
    }
    let pipeline = steps.len() > 1 || steps[0].inverted;
    let mut tokens: Vec<String> = Vec::new();
    if pipeline {
        tokens.push("+proj=pipeline".to_string());
    }
    for step in steps {
        if pipeline {
            tokens.push("+step".to_string());
        }
        if step.inverted {
            tokens.push("+inv".to_string());
        }
        if !step.name.is_empty() {
            tokens.push(format!("+proj={}", step.name));
        }
        for p in &step.params {
            match &p.value {
                Some(v) => tokens.push(format!("+{}={}", p.key, v)),
                None => tokens.push(format!("+{}", p.key)),
            }
        }
    }
    tokens.join(" ")
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uc(f: &mut PipelineFormatter, from: &str, to: &str) {
        f.add_step("unitconvert");
        f.add_param("xy_in", from);
        f.add_param("xy_out", to);
    }

    fn swap(f: &mut PipelineFormatter) {
        f.add_step("axisswap");
        f.add_param("order", "2,1");
    }

    #[test]
    fn test_empty_is_noop() {
        assert_eq!(PipelineFormatter::new().to_pipeline_string(), "+proj=noop");
    }

    #[test]
    fn test_single_step_no_pipeline() {
        let mut f = PipelineFormatter::new();
        f.add_step("utm");
        f.add_param_int("zone", 31);
        f.add_param_flag("south");
        assert_eq!(f.to_pipeline_string(), "+proj=utm +zone=31 +south");
    }

    #[test]
    fn test_single_inverted_step_is_pipeline() {
        let mut f = PipelineFormatter::new();
        f.add_step("cart");
        f.add_param("ellps", "WGS84");
        f.set_current_step_inverted(true);
        assert_eq!(
            f.to_pipeline_string(),
            "+proj=pipeline +step +inv +proj=cart +ellps=WGS84"
        );
    }

    #[test]
    fn test_inversion_reverses_and_toggles() {
        let mut f = PipelineFormatter::new();
        f.start_inversion();
        f.add_step("longlat");
        f.add_param("ellps", "clrk80ign");
        f.add_param("pm", "paris");
        uc(&mut f, "rad", "grad");
        swap(&mut f);
        f.stop_inversion();
        assert_eq!(
            f.to_pipeline_string(),
            "+proj=pipeline +step +proj=axisswap +order=2,1 \
             +step +proj=unitconvert +xy_in=grad +xy_out=rad \
             +step +inv +proj=longlat +ellps=clrk80ign +pm=paris"
        );
    }

    #[test]
    fn test_nested_inversion_restores() {
        let mut f = PipelineFormatter::new();
        f.start_inversion();
        f.start_inversion();
        f.add_step("a");
        f.add_step("b");
        f.stop_inversion();
        f.stop_inversion();
        assert_eq!(f.to_pipeline_string(), "+proj=pipeline +step +proj=a +step +proj=b");
    }

    #[test]
    fn test_cancelling_unit_and_axis_steps() {
        let mut f = PipelineFormatter::new();
        swap(&mut f);
        uc(&mut f, "deg", "rad");
        uc(&mut f, "rad", "deg");
        swap(&mut f);
        assert_eq!(f.to_pipeline_string(), "+proj=noop");
    }

    #[test]
    fn test_inverted_unitconvert_normalized() {
        let mut f = PipelineFormatter::new();
        f.add_step("unitconvert");
        f.add_param("xy_in", "m");
        f.add_param("z_in", "m");
        f.add_param("xy_out", "km");
        f.add_param("z_out", "km");
        f.set_current_step_inverted(true);
        assert_eq!(
            f.to_pipeline_string(),
            "+proj=unitconvert +xy_in=km +z_in=km +xy_out=m +z_out=m"
        );
    }

    #[test]
    fn test_internal_longlat_removed() {
        let mut f = PipelineFormatter::new();
        f.add_step("cart");
        f.add_param("ellps", "WGS84");
        f.set_current_step_inverted(true);
        f.add_step("longlat");
        f.add_param("ellps", "WGS84");
        f.add_step("utm");
        f.add_param_int("zone", 31);
        assert_eq!(
            f.to_pipeline_string(),
            "+proj=pipeline +step +inv +proj=cart +ellps=WGS84 +step +proj=utm +zone=31"
        );
    }

    #[test]
    fn test_trailing_longlat_kept() {
        let mut f = PipelineFormatter::new();
        f.add_step("cart");
        f.set_current_step_inverted(true);
        f.add_step("longlat");
        f.add_param("ellps", "WGS84");
        assert!(f.to_pipeline_string().ends_with("+step +proj=longlat +ellps=WGS84"));
    }

    #[test]
    fn test_helmert_pair_cancels() {
        let mut f = PipelineFormatter::new();
        for sign in [1.0, -1.0] {
            f.add_step("helmert");
            f.add_param_num("x", 84.87 * sign);
            f.add_param_num("y", 96.49 * sign);
            f.add_param_num("z", 116.95 * sign);
        }
        assert_eq!(f.to_pipeline_string(), "+proj=noop");
    }

    #[test]
    fn test_helmert_convention_mismatch_kept() {
        let mut f = PipelineFormatter::new();
        for (sign, conv) in [(1.0, "position_vector"), (-1.0, "coordinate_frame")] {
            f.add_step("helmert");
            f.add_param_num("x", sign);
            f.add_param("convention", conv);
        }
        assert!(f.to_pipeline_string().starts_with("+proj=pipeline"));
    }

    #[test]
    fn test_push_pop_cancel() {
        let mut f = PipelineFormatter::new();
        f.add_step("pop");
        f.add_param_flag("v_3");
        f.add_step("push");
        f.add_param_flag("v_3");
        assert_eq!(f.to_pipeline_string(), "+proj=noop");
    }

    #[test]
    fn test_inversion_swaps_push_pop() {
        let mut f = PipelineFormatter::new();
        f.start_inversion();
        f.add_step("push");
        f.add_param_flag("v_3");
        f.stop_inversion();
        assert_eq!(f.to_pipeline_string(), "+proj=pop +v_3");
    }

    #[test]
    fn test_step_then_inverse_cancel() {
        let mut f = PipelineFormatter::new();
        f.add_step("cart");
        f.add_param("ellps", "intl");
        f.add_step("cart");
        f.add_param("ellps", "intl");
        f.set_current_step_inverted(true);
        assert_eq!(f.to_pipeline_string(), "+proj=noop");
    }

    #[test]
    fn test_number_formatting_in_arrays() {
        let mut f = PipelineFormatter::new();
        f.add_step("longlat");
        f.add_param_nums("towgs84", &[-168.0, -60.0, 320.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(f.to_pipeline_string(), "+proj=longlat +towgs84=-168,-60,320,0,0,0,0");
    }

    #[test]
    fn test_omit_z_stack() {
        let mut f = PipelineFormatter::new();
        assert!(!f.omit_z());
        f.push_omit_z(true);
        assert!(f.omit_z());
        f.pop_omit_z();
        assert!(!f.omit_z());
    }
}
