// geodex\crates\gx_geo\src\crs\equivalence.rs
//! CRS 等价判定

use super::{Crs, CrsKind, SingleCrs};
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::{names_equivalent, ObjectMeta};

fn same_identity(a: &ObjectMeta, b: &ObjectMeta) -> bool {
    let ids_ok = a.identifiers.is_empty() || b.identifiers.is_empty() || a.shares_identifier(b);
    ids_ok && names_equivalent(&a.name, &b.name)
}

fn single_equivalent(a: &SingleCrs, b: &SingleCrs, criterion: Criterion) -> bool {
    a.datum().is_equivalent_to(b.datum(), criterion.for_components())
        && a.cs().is_equivalent_to(b.cs(), criterion)
        && a.geoid_models().len() == b.geoid_models().len()
        && a
            .geoid_models()
            .iter()
            .zip(b.geoid_models())
            .all(|(x, y)| x.grid_file == y.grid_file)
}

impl Equivalence for Crs {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if criterion.is_strict() && !same_identity(&self.meta, &other.meta) {
            return false;
        }
        let components = criterion.for_components();
        match (self.kind(), other.kind()) {
            (CrsKind::Geographic(a), CrsKind::Geographic(b)) => single_equivalent(a, b, criterion),
            (CrsKind::Geodetic(a), CrsKind::Geodetic(b))
            | (CrsKind::Vertical(a), CrsKind::Vertical(b))
            | (CrsKind::Temporal(a), CrsKind::Temporal(b))
            | (CrsKind::Engineering(a), CrsKind::Engineering(b))
            | (CrsKind::Parametric(a), CrsKind::Parametric(b)) => {
                single_equivalent(a, b, components)
            }
            (CrsKind::Projected(a), CrsKind::Projected(b))
            | (CrsKind::DerivedGeodetic(a), CrsKind::DerivedGeodetic(b))
            | (CrsKind::DerivedGeographic(a), CrsKind::DerivedGeographic(b))
            | (CrsKind::DerivedProjected(a), CrsKind::DerivedProjected(b))
            | (CrsKind::DerivedVertical(a), CrsKind::DerivedVertical(b))
            | (CrsKind::DerivedTemporal(a), CrsKind::DerivedTemporal(b))
            | (CrsKind::DerivedEngineering(a), CrsKind::DerivedEngineering(b))
            | (CrsKind::DerivedParametric(a), CrsKind::DerivedParametric(b)) => {
                a.base().is_equivalent_to(b.base(), components)
                    && a.cs().is_equivalent_to(b.cs(), components)
                    && a
                        .conversion()
                        .is_equivalent_ignoring_endpoints(b.conversion(), components)
            }
            (CrsKind::Compound(a), CrsKind::Compound(b)) => {
                a.components().len() == b.components().len()
                    && a
                        .components()
                        .iter()
                        .zip(b.components())
                        .all(|(x, y)| x.is_equivalent_to(y, components))
            }
            (CrsKind::Bound(a), CrsKind::Bound(b)) => {
                a.base().is_equivalent_to(b.base(), components)
                    && a.hub().is_equivalent_to(b.hub(), components)
                    && a
                        .transformation()
                        .is_equivalent_ignoring_endpoints(b.transformation(), components)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::operation::CoordinateOperation;
    use crate::cs::CoordinateSystem;
    use crate::units::UnitOfMeasure;
    use std::sync::Arc;

    #[test]
    fn test_axis_order_relaxation_only_for_geographic() {
        let latlon = wellknown::epsg_4326();
        let lonlat = wellknown::ogc_crs84();
        assert!(!latlon.is_equivalent_to(&lonlat, Criterion::Equivalent));
        assert!(latlon.is_equivalent_to(
            &lonlat,
            Criterion::EquivalentIgnoringAxisOrderForGeographic
        ));
    }

    #[test]
    fn test_kind_must_match() {
        assert!(!wellknown::epsg_4326().is_equivalent_to(&wellknown::epsg_4978(), Criterion::Equivalent));
        assert!(!wellknown::epsg_4326().is_equivalent_to(&wellknown::epsg_4979(), Criterion::Equivalent));
    }

    #[test]
    fn test_projected_compares_conversion() {
        let make = |zone| -> Arc<Crs> {
            Crs::projected(
                ObjectMeta::named("UTM"),
                wellknown::epsg_4326(),
                CoordinateOperation::create_utm(zone, true).unwrap(),
                CoordinateSystem::easting_northing(UnitOfMeasure::METRE),
            )
            .unwrap()
        };
        assert!(make(31).is_equivalent_to(&make(31), Criterion::Strict));
        assert!(!make(31).is_equivalent_to(&make(32), Criterion::Equivalent));
    }

    #[test]
    fn test_strict_compares_names() {
        let a = wellknown::epsg_4807();
        let b = a.alter_name("NTF Paris meridian");
        assert!(a.is_equivalent_to(&b, Criterion::Equivalent));
        assert!(!a.is_equivalent_to(&b, Criterion::Strict));
    }
}
