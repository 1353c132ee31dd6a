// geodex\crates\gx_geo\src\factory\ranking.rs
//! 候选操作的过滤、排序与去重

use super::Operations;
use crate::context::{GridAvailabilityUse, OperationContext, SpatialCriterion};
use crate::crs::Crs;
use crate::metadata::GeographicBoundingBox;
use crate::operation::CoordinateOperation;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// 过滤
// ============================================================================

fn passes_area(
    op: &CoordinateOperation,
    area: Option<&GeographicBoundingBox>,
    criterion: SpatialCriterion,
) -> bool {
    let (Some(area), Some(extent)) = (area, op.domain_of_validity()) else {
        return true;
    };
    match criterion {
        SpatialCriterion::StrictContainment => extent.contains(area),
        SpatialCriterion::PartialIntersection => extent.intersects(area),
    }
}

fn passes_accuracy(op: &CoordinateOperation, desired: Option<f64>) -> bool {
    match desired {
        None => true,
        Some(_) if op.has_ballpark_transformation() => true,
        Some(limit) => op.accuracy().map_or(false, |a| a <= limit),
    }
}

fn passes_grids(op: &CoordinateOperation, ctx: &OperationContext) -> bool {
    let resolver = ctx.grid_resolver();
    match ctx.grid_availability() {
        GridAvailabilityUse::DiscardOperationIfMissingGrid => op
            .grid_names()
            .iter()
            .all(|name| resolver.and_then(|r| r.grid_info(name)).is_some()),
        GridAvailabilityUse::KnownAvailable => {
            op.grids_needed(resolver).iter().all(|g| g.available)
        }
        GridAvailabilityUse::UseForSorting | GridAvailabilityUse::Ignore => true,
    }
}

/// 叶子变换带有其他权威的标识时丢弃；没有标识的合成步骤不受限制
fn passes_authority(op: &CoordinateOperation, authority: Option<&str>) -> bool {
    let Some(authority) = authority else {
        return true;
    };
    if authority.eq_ignore_ascii_case("any") {
        return true;
    }
    op.leaf_operations().iter().all(|leaf| {
        !leaf.is_transformation()
            || leaf.meta.identifiers.is_empty()
            || leaf
                .meta
                .identifiers
                .iter()
                .any(|id| id.in_codespace(authority))
    })
}

// ============================================================================
// 排序
// ============================================================================

struct Entry {
    op: Arc<CoordinateOperation>,
    index: usize,
    ballpark: bool,
    grids_available: bool,
    accuracy: Option<f64>,
    area_rank: u8,
    steps: usize,
}

impl Entry {
    fn new(
        op: Arc<CoordinateOperation>,
        index: usize,
        area: Option<&GeographicBoundingBox>,
        ctx: &OperationContext,
    ) -> Self {
        let area_rank = match (area, op.domain_of_validity()) {
            (Some(area), Some(extent)) => {
                if extent.contains(area) {
                    0
                } else if extent.intersects(area) {
                    1
                } else {
                    2
                }
            }
            _ => 0,
        };
        Self {
            index,
            ballpark: op.has_ballpark_transformation(),
            grids_available: op.grids_needed(ctx.grid_resolver()).iter().all(|g| g.available),
            accuracy: op.accuracy(),
            area_rank,
            steps: op.leaf_operations().len(),
            op,
        }
    }
}

fn compare_accuracy(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Entry, b: &Entry, grids_matter: bool) -> Ordering {
    a.ballpark
        .cmp(&b.ballpark)
        .then_with(|| {
            if grids_matter {
                b.grids_available.cmp(&a.grids_available)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| compare_accuracy(a.accuracy, b.accuracy))
        .then_with(|| a.area_rank.cmp(&b.area_rank))
        .then_with(|| a.steps.cmp(&b.steps))
        .then_with(|| a.op.name().cmp(b.op.name()))
        .then_with(|| a.index.cmp(&b.index))
}

fn dedup_key(op: &CoordinateOperation) -> String {
    match op.to_pipeline_string() {
        Ok(pipeline) => pipeline,
        Err(err) => {
            log::trace!("'{}' 无法导出，按名称去重: {err}", op.name());
            format!("name:{}", op.name())
        }
    }
}

/// 过滤、排序、去重
pub(super) fn rank(
    candidates: Operations,
    source: &Crs,
    target: &Crs,
    ctx: &OperationContext,
) -> Operations {
    let area = ctx.areas_of_interest(source, target);
    let total = candidates.len();
    let mut entries: Vec<Entry> = candidates
        .into_iter()
        .enumerate()
        .filter(|(_, op)| {
            let keep = passes_area(op, area.as_ref(), ctx.spatial_criterion())
                && passes_accuracy(op, ctx.desired_accuracy())
                && passes_grids(op, ctx)
                && (ctx.allow_ballpark() || !op.has_ballpark_transformation())
                && passes_authority(op, ctx.authority());
            if !keep {
                log::trace!("过滤掉候选 '{}'", op.name());
            }
            keep
        })
        .map(|(index, op)| Entry::new(op, index, area.as_ref(), ctx))
        .collect();

    let grids_matter = ctx.grid_availability() == GridAvailabilityUse::UseForSorting;
    entries.sort_by(|a, b| compare(a, b, grids_matter));

    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert(dedup_key(&e.op)));

    if ctx.restrict_to_best() {
        if let Some(first) = entries.first() {
            let (ballpark, accuracy) = (first.ballpark, first.accuracy);
            entries.retain(|e| e.ballpark == ballpark && e.accuracy == accuracy);
        }
    }
    log::debug!("候选 {total} 个，保留 {} 个", entries.len());
    entries.into_iter().map(|e| e.op).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::grid::{GridDescription, InMemoryGridResolver};
    use crate::metadata::{ObjectMeta, PositionalAccuracy};

    fn helmert(name: &str, accuracy: Option<f64>, extent: Option<GeographicBoundingBox>) -> Arc<CoordinateOperation> {
        let mut meta = ObjectMeta::named(name).with_epsg(1000 + name.len() as u32);
        if let Some(bbox) = extent {
            meta = meta.with_extent(bbox);
        }
        CoordinateOperation::create_geocentric_translations(
            meta,
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            -168.0,
            -60.0,
            320.0 + name.len() as f64,
            accuracy.map(|a| PositionalAccuracy::new(a).unwrap()),
        )
    }

    fn ballpark() -> Arc<CoordinateOperation> {
        CoordinateOperation::create_ballpark_geographic_offset(wellknown::epsg_4807(), wellknown::epsg_4326())
    }

    fn names(ops: &[Arc<CoordinateOperation>]) -> Vec<&str> {
        ops.iter().map(|op| op.name()).collect()
    }

    fn run(ops: Operations, ctx: &OperationContext) -> Operations {
        rank(ops, &wellknown::epsg_4807(), &wellknown::epsg_4326(), ctx)
    }

    #[test]
    fn test_sort_order() {
        let ctx = OperationContext::new();
        let ranked = run(
            vec![ballpark(), helmert("b", None, None), helmert("cc", Some(5.0), None), helmert("ddd", Some(1.0), None)],
            &ctx,
        );
        assert_eq!(
            names(&ranked),
            vec!["ddd", "cc", "b", "Ballpark geographic offset from NTF (Paris) to WGS 84"]
        );
    }

    #[test]
    fn test_rank_is_deterministic() {
        let ctx = OperationContext::new();
        let candidates = || {
            vec![
                helmert("c", Some(1.0), None),
                ballpark(),
                helmert("bb", Some(1.0), None),
                helmert("aaa", Some(1.0), None),
            ]
        };
        let first = run(candidates(), &ctx);
        let second = run(candidates(), &ctx);
        assert_eq!(names(&first), names(&second));

        // 并列时按名称排序，与输入顺序无关
        let mut reversed = candidates();
        reversed.reverse();
        let third = run(reversed, &ctx);
        assert_eq!(names(&third), names(&first));
        assert_eq!(&names(&first)[..3], &["aaa", "bb", "c"]);
    }

    #[test]
    fn test_accuracy_filter_keeps_ballpark() {
        let ctx = OperationContext::new().with_desired_accuracy(2.0);
        let ranked = run(vec![helmert("a", Some(5.0), None), helmert("bb", None, None), ballpark()], &ctx);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].has_ballpark_transformation());

        let strict = OperationContext::new().with_allow_ballpark(false);
        assert!(run(vec![ballpark()], &strict).is_empty());
    }

    #[test]
    fn test_area_filter_and_rank() {
        let france = GeographicBoundingBox::new(-4.87, 41.31, 9.63, 51.14);
        let north = GeographicBoundingBox::new(0.0, 48.0, 9.0, 60.0);
        let far = GeographicBoundingBox::new(100.0, 0.0, 110.0, 10.0);
        let ctx = OperationContext::new();
        let ranked = run(
            vec![
                helmert("partial", Some(1.0), Some(north)),
                helmert("far", Some(1.0), Some(far)),
                helmert("whole", Some(1.0), Some(france)),
            ],
            &ctx,
        );
        assert_eq!(names(&ranked), vec!["whole", "partial"]);

        let strict = ctx.with_spatial_criterion(SpatialCriterion::StrictContainment);
        let ranked = run(vec![helmert("partial", Some(1.0), Some(north))], &strict);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_dedup_and_restrict_to_best() {
        let ctx = OperationContext::new();
        let a = helmert("same", Some(1.0), None);
        let ranked = run(vec![a.clone(), a.clone()], &ctx);
        assert_eq!(ranked.len(), 1);

        let best = ctx.with_restrict_to_best(true);
        let ranked = run(
            vec![helmert("x", Some(1.0), None), helmert("yy", Some(1.0), None), helmert("zzz", Some(3.0), None)],
            &best,
        );
        assert_eq!(names(&ranked), vec!["x", "yy"]);
    }

    #[test]
    fn test_authority_restriction() {
        let foreign = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("foreign").with_identifier(crate::metadata::Identifier::new("IGNF", "TSG1")),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            1.0,
            2.0,
            3.0,
            None,
        );
        let ctx = OperationContext::new().with_authority("EPSG");
        let ranked = run(vec![foreign.clone(), helmert("a", None, None), ballpark()], &ctx);
        assert_eq!(ranked.len(), 2);
        assert!(run(vec![foreign], &OperationContext::new().with_authority("any")).len() == 1);
    }

    #[test]
    fn test_grid_policies() {
        let grid_op = CoordinateOperation::create_ntv2(
            ObjectMeta::named("NTF to RGF93").with_epsg(1053),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            "ntf_r93.gsb",
            Some(PositionalAccuracy::new(1.0).unwrap()),
        );
        let plain = helmert("plain", Some(5.0), None);

        let sorting = OperationContext::new();
        let ranked = run(vec![grid_op.clone(), plain.clone()], &sorting);
        assert_eq!(ranked[0].name(), "plain");

        let resolver = Arc::new(
            InMemoryGridResolver::new().with_grid(GridDescription::downloadable("ntf_r93.gsb", "https://cdn/ntf_r93.gsb")),
        );
        let discard = OperationContext::new()
            .with_grid_availability(GridAvailabilityUse::DiscardOperationIfMissingGrid);
        assert_eq!(run(vec![grid_op.clone()], &discard).len(), 0);
        let discard = discard.with_grid_resolver(resolver.clone());
        assert_eq!(run(vec![grid_op.clone()], &discard).len(), 1);

        let known = OperationContext::new()
            .with_grid_availability(GridAvailabilityUse::KnownAvailable)
            .with_grid_resolver(resolver);
        assert!(run(vec![grid_op.clone()], &known).is_empty());

        let available = Arc::new(InMemoryGridResolver::new().with_available("ntf_r93.gsb"));
        let known = known.with_grid_resolver(available);
        assert_eq!(run(vec![grid_op, plain], &known)[0].name(), "NTF to RGF93");
    }
}
