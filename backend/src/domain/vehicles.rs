//! Vehicle fitment hierarchy.
//!
//! Drives the chained "parts for my car" filter: make → model → engine. A
//! product fits a set of engines; filtering by any level of the chain
//! resolves down to engines before touching the product listing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::CatalogValidationError;
use super::slug::is_valid_slug;

/// Engine fuel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    /// Petrol / gasoline.
    Petrol,
    /// Diesel.
    Diesel,
    /// Factory LPG or petrol with LPG conversion.
    Lpg,
    /// Petrol-electric hybrid.
    Hybrid,
    /// Battery electric.
    Electric,
}

impl Fuel {
    /// Database/text representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Petrol => "petrol",
            Self::Diesel => "diesel",
            Self::Lpg => "lpg",
            Self::Hybrid => "hybrid",
            Self::Electric => "electric",
        }
    }

    /// Parse the text representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "petrol" => Some(Self::Petrol),
            "diesel" => Some(Self::Diesel),
            "lpg" => Some(Self::Lpg),
            "hybrid" => Some(Self::Hybrid),
            "electric" => Some(Self::Electric),
            _ => None,
        }
    }
}

/// A vehicle make (VW, BMW, Dacia, …), distinct from part brands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleBrand {
    /// Primary key.
    pub id: Uuid,
    /// URL slug, e.g. `vw`.
    pub slug: String,
    /// Display name.
    pub name: String,
}

impl VehicleBrand {
    /// Validate and construct a vehicle brand.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogValidationError`] for an invalid slug or empty name.
    pub fn new(id: Uuid, slug: String, name: String) -> Result<Self, CatalogValidationError> {
        if !is_valid_slug(&slug) {
            return Err(CatalogValidationError::InvalidSlug {
                field: "vehicle_brand.slug",
            });
        }
        if name.trim().is_empty() {
            return Err(CatalogValidationError::Empty {
                field: "vehicle_brand.name",
            });
        }
        Ok(Self { id, slug, name })
    }
}

/// A model generation within a make, e.g. `Golf V (2003-2009)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModel {
    /// Primary key.
    pub id: Uuid,
    /// Owning make.
    pub vehicle_brand_id: Uuid,
    /// URL slug, e.g. `golf-5`.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// First production year.
    pub year_from: i32,
    /// Last production year; `None` while still in production.
    pub year_to: Option<i32>,
}

impl VehicleModel {
    /// Validate and construct a vehicle model.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogValidationError`] for an invalid slug, empty name,
    /// or an inverted production range.
    pub fn new(
        id: Uuid,
        vehicle_brand_id: Uuid,
        slug: String,
        name: String,
        year_from: i32,
        year_to: Option<i32>,
    ) -> Result<Self, CatalogValidationError> {
        if !is_valid_slug(&slug) {
            return Err(CatalogValidationError::InvalidSlug {
                field: "vehicle_model.slug",
            });
        }
        if name.trim().is_empty() {
            return Err(CatalogValidationError::Empty {
                field: "vehicle_model.name",
            });
        }
        validate_year_range(year_from, year_to, "vehicle_model.year_to")?;
        Ok(Self {
            id,
            vehicle_brand_id,
            slug,
            name,
            year_from,
            year_to,
        })
    }
}

/// A specific engine fitted to a model, the leaf of the fitment chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleEngine {
    /// Primary key.
    pub id: Uuid,
    /// Owning model.
    pub model_id: Uuid,
    /// Manufacturer engine code, e.g. `BKD`.
    pub code: String,
    /// Display name, e.g. `2.0 TDI 140`.
    pub name: String,
    /// Fuel type.
    pub fuel: Fuel,
    /// Rated power in kW.
    pub power_kw: i32,
    /// First production year.
    pub year_from: i32,
    /// Last production year; `None` while still in production.
    pub year_to: Option<i32>,
}

impl VehicleEngine {
    /// Validate and construct an engine.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogValidationError`] for an empty code/name, a
    /// non-positive power figure, or an inverted production range.
    pub fn new(
        id: Uuid,
        model_id: Uuid,
        code: String,
        name: String,
        fuel: Fuel,
        power_kw: i32,
        year_from: i32,
        year_to: Option<i32>,
    ) -> Result<Self, CatalogValidationError> {
        if code.trim().is_empty() {
            return Err(CatalogValidationError::Empty {
                field: "vehicle_engine.code",
            });
        }
        if name.trim().is_empty() {
            return Err(CatalogValidationError::Empty {
                field: "vehicle_engine.name",
            });
        }
        if power_kw <= 0 {
            return Err(CatalogValidationError::OutOfRange {
                field: "vehicle_engine.power_kw",
                message: "must be positive",
            });
        }
        validate_year_range(year_from, year_to, "vehicle_engine.year_to")?;
        Ok(Self {
            id,
            model_id,
            code,
            name,
            fuel,
            power_kw,
            year_from,
            year_to,
        })
    }

    /// `true` when the engine was in production during `year`.
    #[must_use]
    pub fn in_production_during(&self, year: i32) -> bool {
        year >= self.year_from && self.year_to.is_none_or(|last| year <= last)
    }
}

fn validate_year_range(
    year_from: i32,
    year_to: Option<i32>,
    field: &'static str,
) -> Result<(), CatalogValidationError> {
    if year_to.is_some_and(|last| last < year_from) {
        return Err(CatalogValidationError::OutOfRange {
            field,
            message: "must not precede the first production year",
        });
    }
    Ok(())
}

/// A brand/model/year candidate decoded from a VIN by the external vehicle
/// data service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VinCandidate {
    /// Decoded make name as reported by the service.
    pub make: String,
    /// Decoded model name.
    pub model: String,
    /// Decoded model year, when the service reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i32>,
    /// Decoded engine description, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

/// Basic VIN shape check: 17 characters, no `I`/`O`/`Q`.
///
/// Checksum validation is left to the external decoder; this guards the
/// outbound call against obviously malformed input.
#[must_use]
pub fn is_plausible_vin(vin: &str) -> bool {
    vin.len() == 17
        && vin.chars().all(|ch| {
            (ch.is_ascii_uppercase() || ch.is_ascii_digit())
                && ch != 'I'
                && ch != 'O'
                && ch != 'Q'
        })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("WVWZZZ1KZ6W000001", true)]
    #[case("wvwzzz1kz6w000001", false)]
    #[case("WVWZZZ1KZ6W00000", false)]
    #[case("WVWZZZ1KZ6WO00001", false)]
    fn vin_plausibility(#[case] vin: &str, #[case] expected: bool) {
        assert_eq!(is_plausible_vin(vin), expected);
    }

    #[test]
    fn inverted_production_range_is_rejected() {
        let error = VehicleModel::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "golf-5".to_owned(),
            "Golf V".to_owned(),
            2009,
            Some(2003),
        )
        .expect_err("inverted range should be rejected");
        assert!(matches!(error, CatalogValidationError::OutOfRange { .. }));
    }

    fn engine(year_from: i32, year_to: Option<i32>) -> VehicleEngine {
        VehicleEngine::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "BKD".to_owned(),
            "2.0 TDI 140".to_owned(),
            Fuel::Diesel,
            103,
            year_from,
            year_to,
        )
        .expect("valid engine fixture")
    }

    #[rstest]
    #[case(2003, Some(2008), 2005, true)]
    #[case(2003, Some(2008), 2009, false)]
    #[case(2003, Some(2008), 2002, false)]
    #[case(2019, None, 2026, true)]
    fn production_year_matching(
        #[case] from: i32,
        #[case] to: Option<i32>,
        #[case] probe: i32,
        #[case] expected: bool,
    ) {
        assert_eq!(engine(from, to).in_production_during(probe), expected);
    }

    #[test]
    fn fuel_round_trips_text_form() {
        for fuel in [Fuel::Petrol, Fuel::Diesel, Fuel::Lpg, Fuel::Hybrid, Fuel::Electric] {
            assert_eq!(Fuel::parse(fuel.as_str()), Some(fuel));
        }
        assert_eq!(Fuel::parse("steam"), None);
    }
}
