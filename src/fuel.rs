//! Fuel grades and their source identifiers.

use crate::error::DepletionError;
use std::fmt;
use std::str::FromStr;

/// Closed set of fuel grades sold at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    Ai80,
    Ai92,
    Ai95,
    Ai98,
    DieselSummer,
    DieselWinter25,
    DieselWinter32,
    Lpg,
    Ai95Import,
}

impl FuelType {
    pub const ALL: [FuelType; 9] = [
        FuelType::Ai80,
        FuelType::Ai92,
        FuelType::Ai95,
        FuelType::Ai98,
        FuelType::DieselSummer,
        FuelType::DieselWinter25,
        FuelType::DieselWinter32,
        FuelType::Lpg,
        FuelType::Ai95Import,
    ];

    /// Name as shown to operators.
    pub fn display_name(&self) -> &'static str {
        match self {
            FuelType::Ai80 => "Аи-80",
            FuelType::Ai92 => "Аи-92",
            FuelType::Ai95 => "Аи-95",
            FuelType::Ai98 => "Аи-98",
            FuelType::DieselSummer => "ДТ-Л",
            FuelType::DieselWinter25 => "ДТ-3-25",
            FuelType::DieselWinter32 => "ДТ-3-32",
            FuelType::Lpg => "СУГ",
            FuelType::Ai95Import => "Аи-95-import",
        }
    }

    /// Identifier used in the readings table.
    pub fn id(&self) -> &'static str {
        match self {
            FuelType::Ai80 => "3300000000",
            FuelType::Ai92 => "3300000002",
            FuelType::Ai95 => "3300000005",
            FuelType::Ai98 => "3300000008",
            FuelType::DieselSummer => "3300000010",
            FuelType::DieselWinter25 => "3300000029",
            FuelType::DieselWinter32 => "3300000038",
            FuelType::Lpg => "3400000000",
            FuelType::Ai95Import => "3300000095",
        }
    }

    fn latin_alias(&self) -> &'static str {
        match self {
            FuelType::Ai80 => "AI-80",
            FuelType::Ai92 => "AI-92",
            FuelType::Ai95 => "AI-95",
            FuelType::Ai98 => "AI-98",
            FuelType::DieselSummer => "DT-L",
            FuelType::DieselWinter25 => "DT-3-25",
            FuelType::DieselWinter32 => "DT-3-32",
            FuelType::Lpg => "LPG",
            FuelType::Ai95Import => "AI-95-import",
        }
    }

    /// Look up a grade by its readings-table identifier.
    pub fn from_id(id: &str) -> Option<FuelType> {
        let id = id.trim();
        Self::ALL.into_iter().find(|f| f.id() == id)
    }
}

impl FromStr for FuelType {
    type Err = DepletionError;

    /// Accepts the display name, a Latin alias or the numeric id,
    /// ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::from_id(&wanted)
            .or_else(|| {
                Self::ALL.into_iter().find(|f| {
                    f.display_name().to_lowercase() == wanted
                        || f.latin_alias().to_lowercase() == wanted
                })
            })
            .ok_or_else(|| DepletionError::UnknownFuel(s.trim().to_string()))
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_map_to_ids() {
        let expected = [
            ("Аи-80", "3300000000"),
            ("Аи-92", "3300000002"),
            ("Аи-95", "3300000005"),
            ("Аи-98", "3300000008"),
            ("ДТ-Л", "3300000010"),
            ("ДТ-3-25", "3300000029"),
            ("ДТ-3-32", "3300000038"),
            ("СУГ", "3400000000"),
            ("Аи-95-import", "3300000095"),
        ];
        for (name, id) in expected {
            let fuel: FuelType = name.parse().unwrap();
            assert_eq!(fuel.id(), id);
            assert_eq!(fuel.to_string(), name);
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!("ai-92".parse::<FuelType>().unwrap(), FuelType::Ai92);
        assert_eq!(" LPG ".parse::<FuelType>().unwrap(), FuelType::Lpg);
        assert_eq!("аи-95".parse::<FuelType>().unwrap(), FuelType::Ai95);
        assert_eq!("3300000010".parse::<FuelType>().unwrap(), FuelType::DieselSummer);
    }

    #[test]
    fn unknown_fuel_is_an_input_error() {
        let err = "Аи-100".parse::<FuelType>().unwrap_err();
        assert!(matches!(err, DepletionError::UnknownFuel(ref name) if name == "Аи-100"));
    }

    #[test]
    fn from_id_round_trips() {
        for fuel in FuelType::ALL {
            assert_eq!(FuelType::from_id(fuel.id()), Some(fuel));
        }
        assert_eq!(FuelType::from_id("42"), None);
    }
}
