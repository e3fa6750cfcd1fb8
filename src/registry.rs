//! Built-in template definitions.
//!
//! One entry per supported (unit, certificate type) combination. Field order
//! follows the roster worksheet: `fields[i]` is read from column `i + 1`.
//! Coordinates are the left-aligned text baseline origin on the background
//! image. Adding a template is one entry here plus one background image in
//! the template directory; the pipeline itself never changes.

use crate::resolve::{CertTypeKey, UnitKey};

pub struct TemplateConfig {
    pub fields: &'static [&'static str],
    pub coords: &'static [(&'static str, (f32, f32))],
}

/// Column layout shared by all roster uploads.
pub const ROSTER_FIELDS: &[&str] = &[
    "rank", "name", "regtNo", "unit", "event", "position", "date", "place", "certNo",
];

const MERIT_COORDS: &[(&str, (f32, f32))] = &[
    ("rank", (819.4, 675.6)),
    ("name", (1186.8, 675.6)),
    ("regtNo", (542.3, 735.4)),
    ("unit", (502.8, 799.6)),
    ("event", (555.0, 420.0)),
    ("position", (220.0, 460.0)),
    ("date", (120.0, 530.0)),
    ("place", (220.0, 560.0)),
    ("certNo", (150.0, 600.0)),
];

// Participation certificates carry no placing, so there is no "position"
// slot on that layout; the column still exists in the roster and is ignored.
const PARTICIPATION_COORDS: &[(&str, (f32, f32))] = &[
    ("rank", (780.0, 640.0)),
    ("name", (1150.0, 640.0)),
    ("regtNo", (542.3, 704.0)),
    ("unit", (502.8, 768.0)),
    ("event", (555.0, 470.0)),
    ("date", (120.0, 560.0)),
    ("place", (220.0, 590.0)),
    ("certNo", (150.0, 630.0)),
];

static MERIT: TemplateConfig = TemplateConfig {
    fields: ROSTER_FIELDS,
    coords: MERIT_COORDS,
};

static PARTICIPATION: TemplateConfig = TemplateConfig {
    fields: ROSTER_FIELDS,
    coords: PARTICIPATION_COORDS,
};

static ENTRIES: &[(UnitKey, CertTypeKey, &TemplateConfig)] = &[
    (UnitKey::Naval, CertTypeKey::Merit, &MERIT),
    (UnitKey::Naval, CertTypeKey::Participation, &PARTICIPATION),
    (UnitKey::GirlsBn, CertTypeKey::Merit, &MERIT),
    (UnitKey::GirlsBn, CertTypeKey::Participation, &PARTICIPATION),
    (UnitKey::Air, CertTypeKey::Merit, &MERIT),
    (UnitKey::Air, CertTypeKey::Participation, &PARTICIPATION),
    (UnitKey::ChdBn2, CertTypeKey::Merit, &MERIT),
    (UnitKey::ChdBn2, CertTypeKey::Participation, &PARTICIPATION),
];

pub fn lookup(unit: UnitKey, cert_type: CertTypeKey) -> Option<&'static TemplateConfig> {
    ENTRIES
        .iter()
        .find(|(u, c, _)| *u == unit && *c == cert_type)
        .map(|(_, _, config)| *config)
}
