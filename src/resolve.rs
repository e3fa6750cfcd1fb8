//! Free-text selector normalization.
//!
//! The upload form sends the unit and certificate type as free text. Units
//! resolve through ordered substring rules; rule order matters because the
//! substrings are not mutually exclusive, so the first match wins.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKey {
    Naval,
    GirlsBn,
    Air,
    ChdBn2,
}

impl UnitKey {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKey::Naval => "naval",
            UnitKey::GirlsBn => "girlsbn",
            UnitKey::Air => "air",
            UnitKey::ChdBn2 => "2chdbn",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CertTypeKey {
    Merit,
    Participation,
}

impl CertTypeKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CertTypeKey::Merit => "merit",
            CertTypeKey::Participation => "participation",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_lowercase().as_str() {
            "merit" => CertTypeKey::Merit,
            "participation" => CertTypeKey::Participation,
            _ => return None,
        })
    }
}

// Ordered: naval before girls before air, numeric battalion last.
const UNIT_RULES: &[(&str, UnitKey)] = &[
    ("naval", UnitKey::Naval),
    ("girls", UnitKey::GirlsBn),
    ("air", UnitKey::Air),
    ("2 chd", UnitKey::ChdBn2),
];

pub fn resolve_unit_key(text: &str) -> Option<UnitKey> {
    let t = text.to_lowercase();
    UNIT_RULES
        .iter()
        .find(|(pat, _)| t.contains(pat))
        .map(|(_, key)| *key)
}

pub fn resolve_cert_type_key(text: &str) -> Option<CertTypeKey> {
    CertTypeKey::parse(text)
}

/// Registry lookup identifier, also the stem of the template asset filename.
pub fn composite_key(unit: UnitKey, cert_type: CertTypeKey) -> String {
    format!("{}-{}", unit.as_str(), cert_type.as_str())
}
