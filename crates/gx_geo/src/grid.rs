// geodex\crates\gx_geo\src\grid.rs
//! 格网文件信息
//!
//! 操作只记录格网短名；格网是否在本地可用、从哪里下载，
//! 由外部实现的 [`GridResolver`] 回答。

use std::collections::HashMap;

/// 格网描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDescription {
    /// 操作参数中出现的短名
    pub short_name: String,
    /// 本地完整路径（可用时）
    pub full_name: Option<String>,
    /// 所属资源包
    pub package_name: Option<String>,
    /// 下载地址
    pub url: Option<String>,
    /// 是否可直接下载
    pub direct_download: bool,
    /// 是否开放许可
    pub open_license: bool,
    /// 本地是否可用
    pub available: bool,
}

impl GridDescription {
    /// 解析器不认识的格网
    pub fn unknown(short_name: &str) -> Self {
        Self {
            short_name: short_name.to_string(),
            full_name: None,
            package_name: None,
            url: None,
            direct_download: false,
            open_license: false,
            available: false,
        }
    }

    /// 本地可用的格网
    pub fn available(short_name: &str, full_name: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            open_license: true,
            available: true,
            ..Self::unknown(short_name)
        }
    }

    /// 可下载但本地缺失的格网
    pub fn downloadable(short_name: &str, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            direct_download: true,
            open_license: true,
            ..Self::unknown(short_name)
        }
    }
}

/// 格网信息查询接口
pub trait GridResolver: Send + Sync {
    /// 按短名查询；不认识返回 `None`
    fn grid_info(&self, short_name: &str) -> Option<GridDescription>;
}

/// 内存格网表
#[derive(Debug, Clone, Default)]
pub struct InMemoryGridResolver {
    grids: HashMap<String, GridDescription>,
}

impl InMemoryGridResolver {
    /// 空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记格网
    #[must_use]
    pub fn with_grid(mut self, grid: GridDescription) -> Self {
        self.grids.insert(grid.short_name.clone(), grid);
        self
    }

    /// 登记一个本地可用的格网（完整路径同短名）
    #[must_use]
    pub fn with_available(self, short_name: &str) -> Self {
        self.with_grid(GridDescription::available(short_name, short_name))
    }

    /// 已登记数量
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

impl GridResolver for InMemoryGridResolver {
    fn grid_info(&self, short_name: &str) -> Option<GridDescription> {
        self.grids.get(short_name).cloned()
    }
}
