//! Single-choice answers and the option catalogues for multi-choice answers.
//!
//! Every single-choice field is a closed enum whose on-disk and on-screen form is its label.
//! Serde uses the same labels, so YAML form files read exactly like the stored table.

use serde::{Deserialize, Serialize};

/// A closed set of labelled options presented as one radio group.
pub trait Choice: Copy + Eq + Default + 'static {
    /// Options in display order.
    const OPTIONS: &'static [Self];

    /// Text shown to the user and stored in the table.
    fn label(self) -> &'static str;

    /// Parses a stored or typed label. Surrounding whitespace is ignored, case is not.
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::OPTIONS.iter().copied().find(|o| o.label() == label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    #[default]
    No,
    Yes,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl Choice for YesNo {
    const OPTIONS: &'static [Self] = &[YesNo::No, YesNo::Yes];

    fn label(self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Yes => "Yes",
        }
    }
}

/// Histological grade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    I,
    II,
    III,
    #[default]
    #[serde(rename = "Not Reported")]
    NotReported,
}

impl Choice for Grade {
    const OPTIONS: &'static [Self] = &[Grade::I, Grade::II, Grade::III, Grade::NotReported];

    fn label(self) -> &'static str {
        match self {
            Grade::I => "I",
            Grade::II => "II",
            Grade::III => "III",
            Grade::NotReported => "Not Reported",
        }
    }
}

/// Pathology finding used for necrosis and lymphovascular invasion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finding {
    Present,
    Absent,
    #[default]
    #[serde(rename = "Not Reported")]
    NotReported,
}

impl Choice for Finding {
    const OPTIONS: &'static [Self] = &[Finding::Present, Finding::Absent, Finding::NotReported];

    fn label(self) -> &'static str {
        match self {
            Finding::Present => "Present",
            Finding::Absent => "Absent",
            Finding::NotReported => "Not Reported",
        }
    }
}

/// Two-state clinical sign (dysuria, ureteral stenosis).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    #[default]
    Absent,
    Present,
}

impl Presence {
    pub fn is_present(self) -> bool {
        self == Presence::Present
    }
}

impl Choice for Presence {
    const OPTIONS: &'static [Self] = &[Presence::Absent, Presence::Present];

    fn label(self) -> &'static str {
        match self {
            Presence::Absent => "Absent",
            Presence::Present => "Present",
        }
    }
}

/// Anatomic location of the primary tumour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    #[default]
    Extremity,
    Trunk,
    #[serde(rename = "Head and Neck")]
    HeadAndNeck,
    Retroperitoneum,
    Prostate,
    #[serde(rename = "Non-Extremity Bone")]
    NonExtremityBone,
    Other,
}

impl Location {
    /// The staging system that applies to this location.
    pub fn staging_system(self) -> StagingSystem {
        match self {
            Location::Extremity => StagingSystem::Extremity,
            Location::Retroperitoneum => StagingSystem::Retroperitoneum,
            _ => StagingSystem::NotStaged,
        }
    }
}

impl Choice for Location {
    const OPTIONS: &'static [Self] = &[
        Location::Extremity,
        Location::Trunk,
        Location::HeadAndNeck,
        Location::Retroperitoneum,
        Location::Prostate,
        Location::NonExtremityBone,
        Location::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            Location::Extremity => "Extremity",
            Location::Trunk => "Trunk",
            Location::HeadAndNeck => "Head and Neck",
            Location::Retroperitoneum => "Retroperitoneum",
            Location::Prostate => "Prostate",
            Location::NonExtremityBone => "Non-Extremity Bone",
            Location::Other => "Other",
        }
    }
}

/// Overall treatment tolerance reported at follow-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tolerance {
    #[default]
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Choice for Tolerance {
    const OPTIONS: &'static [Self] = &[
        Tolerance::Excellent,
        Tolerance::Good,
        Tolerance::Fair,
        Tolerance::Poor,
    ];

    fn label(self) -> &'static str {
        match self {
            Tolerance::Excellent => "Excellent",
            Tolerance::Good => "Good",
            Tolerance::Fair => "Fair",
            Tolerance::Poor => "Poor",
        }
    }
}

/// The two clinical staging systems are mutually exclusive by location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StagingSystem {
    Extremity,
    Retroperitoneum,
    NotStaged,
}

/// WHO soft-tissue tumour histologies offered by the form.
pub const HISTOLOGY_OPTIONS: &[&str] = &[
    "Atypical lipomatous tumour",
    "Liposarcoma",
    "Myxoid liposarcoma",
    "Pleomorphic liposarcoma",
    "Dermatofibrosarcoma protuberans NOS",
    "Dermatofibrosarcoma protuberans, fibrosarcomatous",
    "Solitary fibrous tumour NOS",
    "Inflammatory myofibroblastic tumour",
    "Epithelioid inflammatory myofibroblastic sarcoma",
    "Myxoinflammatory fibroblastic sarcoma",
    "Infantile fibrosarcoma",
    "Fibrosarcoma NOS",
    "Myxofibrosarcoma",
    "Epithelioid myxofibrosarcoma",
    "Low grade fibromyxoid sarcoma",
    "Sclerosing epithelioid fibrosarcoma",
    "Plexiform fibrohistiocytic tumour",
    "Giant cell tumour of soft parts",
    "Haemangioendothelioma",
    "Kaposi sarcoma",
    "Epithelioid haemangioendothelioma NOS",
    "Epithelioid haemangioendothelioma with WWTR1-CAMTA1 fusion",
    "Epithelioid haemangioendothelioma with YAP1-TFE3 fusion",
    "Angiosarcoma",
    "Glomus tumour, malignant",
    "Leiomyosarcoma NOS",
    "Embryonal rhabdomyosarcoma NOS",
    "Embryonal rhabdomyosarcoma, pleomorphic",
    "Alveolar rhabdomyosarcoma",
    "Pleomorphic rhabdomyosarcoma NOS",
    "Spindle cell rhabdomyosarcoma",
    "Osteosarcoma, extraskeletal",
    "Malignant peripheral nerve sheath tumour NOS",
    "Malignant peripheral nerve sheath tumour, epithelioid",
    "Malignant melanotic nerve sheath tumour",
    "Atypical fibroxanthoma",
    "Angiomatoid fibrous histiocytoma",
    "Ossifying fibromyxoid tumour NOS",
    "Synovial sarcoma, specify type",
    "Epithelioid sarcoma",
    "Proximal or large cell epithelioid sarcoma",
    "Classic epithelioid sarcoma",
    "Alveolar soft part sarcoma",
    "Clear cell sarcoma of soft tissue",
    "Extraskeletal myxoid chondrosarcoma",
    "Desmoplastic small round cell tumour",
    "Rhabdoid tumour of soft tissue",
    "Perivascular epithelioid tumour, malignant",
    "Myoepithelial carcinoma",
    "Mixed tumour, malignant, NOS",
    "Undifferentiated sarcoma",
    "Spindle cell sarcoma, undifferentiated",
    "Pleomorphic sarcoma, undifferentiated",
    "Round cell sarcoma, undifferentiated",
    "Ewing sarcoma",
    "Other",
];

/// Clinical stage options for extremity tumours, with help text where defined.
pub const EXTREMITY_STAGES: &[(&str, Option<&str>)] = &[
    ("cT0", Some("No evidence of primary tumor")),
    ("cTx", Some("Primary tumor cannot be assessed")),
    ("cT1", Some("Tumor ≤5 cm in greatest dimension")),
    ("cT2", Some("Tumor >5 cm but ≤10 cm in greatest dimension")),
    ("cT3", Some("Tumor >10 cm in greatest dimension")),
    (
        "cT4",
        Some("Tumor of any size with direct extension into the ipsilateral adrenal gland"),
    ),
    ("cN0", None),
    ("cN1", None),
    ("M0", None),
    ("M1", None),
    ("Non Extremity", None),
];

/// Clinical stage options for retroperitoneal tumours, with help text where defined.
pub const RETROPERITONEUM_STAGES: &[(&str, Option<&str>)] = &[
    ("cT0", Some("No evidence of primary tumor")),
    ("cTx", Some("Primary tumor cannot be assessed")),
    ("cT1", Some("Organ confined tumor")),
    ("cT2a", Some("Tumor invades serosa or visceral peritoneum")),
    ("cT2b", Some("Tumor extends beyond serosa (mesentery)")),
    ("cT3", Some("Tumor invades another organ")),
    ("cT4a", Some("Multifocal tumor involvement (2 sites)")),
    ("cT4b", Some("Multifocal tumor involvement (3-5 sites)")),
    ("cT4c", Some("Multifocal tumor involvement (> 5 sites)")),
    ("cN0", None),
    ("cN1", None),
    ("M0", None),
    ("M1", None),
    ("Non Retroperitoneal", None),
];

/// Label recorded in the extremity staging list for tumours staged the other way.
pub const NON_EXTREMITY_STAGE: &str = "Non Extremity";

/// Label recorded in the retroperitoneal staging list for tumours staged the other way.
pub const NON_RETROPERITONEAL_STAGE: &str = "Non Retroperitoneal";

/// Systemic treatment regimens offered by the form.
pub const SYSTEMIC_TREATMENT_OPTIONS: &[&str] = &[
    "None",
    "Conventional Chemotherapy",
    "Target Therapy",
    "Immunotherapy",
    "Radioligand",
    "ADC",
    "Others",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for grade in Grade::OPTIONS {
            assert_eq!(Grade::from_label(grade.label()), Some(*grade));
        }
        for location in Location::OPTIONS {
            assert_eq!(Location::from_label(location.label()), Some(*location));
        }
    }

    #[test]
    fn from_label_trims_but_keeps_case() {
        assert_eq!(Finding::from_label(" Not Reported "), Some(Finding::NotReported));
        assert_eq!(Finding::from_label("present"), None);
        assert_eq!(Finding::from_label("Unifocal"), None);
    }

    #[test]
    fn serde_uses_labels() {
        let yaml = serde_yaml::to_string(&Location::HeadAndNeck).unwrap();
        assert_eq!(yaml.trim(), "Head and Neck");
        let parsed: Grade = serde_yaml::from_str("Not Reported").unwrap();
        assert_eq!(parsed, Grade::NotReported);
    }

    #[test]
    fn staging_system_follows_location() {
        assert_eq!(
            Location::Extremity.staging_system(),
            StagingSystem::Extremity
        );
        assert_eq!(
            Location::Retroperitoneum.staging_system(),
            StagingSystem::Retroperitoneum
        );
        assert_eq!(Location::Trunk.staging_system(), StagingSystem::NotStaged);
    }

    #[test]
    fn defaults_match_form_defaults() {
        assert_eq!(YesNo::default(), YesNo::No);
        assert_eq!(Grade::default(), Grade::NotReported);
        assert_eq!(Finding::default(), Finding::NotReported);
        assert_eq!(Presence::default(), Presence::Absent);
        assert_eq!(Location::default(), Location::Extremity);
        assert_eq!(Tolerance::default(), Tolerance::Excellent);
    }
}
