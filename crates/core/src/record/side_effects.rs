//! CTCAE v5 graded side effects.
//!
//! Each toxicity has its own fixed set of admissible grades (bladder perforation has no grade I,
//! fatigue stops at III, and so on) and its own label for the zero grade: some were collected as
//! "None", others as "Absent". Both spellings are accepted when reading; writing always uses the
//! toxicity's own spelling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CTCAE severity grade. `Absent` is grade 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CtcaeGrade {
    #[default]
    #[serde(alias = "None")]
    Absent,
    I,
    II,
    III,
    IV,
    V,
}

impl CtcaeGrade {
    fn roman(self) -> &'static str {
        match self {
            CtcaeGrade::Absent => "0",
            CtcaeGrade::I => "I",
            CtcaeGrade::II => "II",
            CtcaeGrade::III => "III",
            CtcaeGrade::IV => "IV",
            CtcaeGrade::V => "V",
        }
    }
}

/// Display group a toxicity belongs to on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideEffectSection {
    Urinary,
    Gastrointestinal,
    Fatigue,
    Other,
}

impl SideEffectSection {
    pub fn title(self) -> &'static str {
        match self {
            SideEffectSection::Urinary => "Urinary Side Effects",
            SideEffectSection::Gastrointestinal => "Gastrointestinal Side Effects",
            SideEffectSection::Fatigue => "Fatigue",
            SideEffectSection::Other => "Side Effects - Others",
        }
    }
}

/// A graded toxicity collected by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Toxicity {
    Cystitis,
    #[serde(rename = "Bladder_Perforation")]
    BladderPerforation,
    Hematuria,
    #[serde(rename = "Urinary_Fistula")]
    UrinaryFistula,
    #[serde(rename = "Urinary_Obstruction")]
    UrinaryObstruction,
    #[serde(rename = "Urinary_Retention")]
    UrinaryRetention,
    Diarrhea,
    Nausea,
    #[serde(rename = "Bowel_Perforation")]
    BowelPerforation,
    #[serde(rename = "Bowel_Obstruction")]
    BowelObstruction,
    Proctitis,
    #[serde(rename = "Rectal_Fistula")]
    RectalFistula,
    #[serde(rename = "Rectal_Hemorrhage")]
    RectalHemorrhage,
    #[serde(rename = "Rectal_Pain")]
    RectalPain,
    #[serde(rename = "Rectal_Perforation")]
    RectalPerforation,
    #[serde(rename = "Rectal_Stenosis")]
    RectalStenosis,
    #[serde(rename = "Organ_Failure")]
    OrganFailure,
    Fatigue,
    Pneumonitis,
    Esophagitis,
}

use CtcaeGrade::{Absent, I, II, III, IV, V};

const ZERO_TO_V: &[CtcaeGrade] = &[Absent, I, II, III, IV, V];
const PERFORATION: &[CtcaeGrade] = &[Absent, II, III, IV, V];
const ZERO_TO_III: &[CtcaeGrade] = &[Absent, I, II, III];
const SEVERE_ONLY: &[CtcaeGrade] = &[Absent, III, IV, V];

const NO_CHANGE: &str = "No change";
const DEATH: &str = "Death";
const URGENT: &str = "Life-threatening consequences; urgent intervention indicated";
const OBSERVATION_ONLY: &str =
    "Asymptomatic; clinical or diagnostic observations only; intervention not indicated";

const PERFORATION_TEXT: &[&str] = &[
    NO_CHANGE,
    "Invasive intervention not indicated",
    "Symptomatic; medical intervention indicated",
    "Life-threatening consequences; urgent intervention indicated",
    DEATH,
];

impl Toxicity {
    /// All toxicities in form order.
    pub const ALL: &'static [Toxicity] = &[
        Toxicity::Cystitis,
        Toxicity::BladderPerforation,
        Toxicity::Hematuria,
        Toxicity::UrinaryFistula,
        Toxicity::UrinaryObstruction,
        Toxicity::UrinaryRetention,
        Toxicity::Diarrhea,
        Toxicity::Nausea,
        Toxicity::BowelPerforation,
        Toxicity::BowelObstruction,
        Toxicity::Proctitis,
        Toxicity::RectalFistula,
        Toxicity::RectalHemorrhage,
        Toxicity::RectalPain,
        Toxicity::RectalPerforation,
        Toxicity::RectalStenosis,
        Toxicity::OrganFailure,
        Toxicity::Fatigue,
        Toxicity::Pneumonitis,
        Toxicity::Esophagitis,
    ];

    /// Column name in the registry table.
    pub fn column(self) -> &'static str {
        match self {
            Toxicity::Cystitis => "Cystitis",
            Toxicity::BladderPerforation => "Bladder_Perforation",
            Toxicity::Hematuria => "Hematuria",
            Toxicity::UrinaryFistula => "Urinary_Fistula",
            Toxicity::UrinaryObstruction => "Urinary_Obstruction",
            Toxicity::UrinaryRetention => "Urinary_Retention",
            Toxicity::Diarrhea => "Diarrhea",
            Toxicity::Nausea => "Nausea",
            Toxicity::BowelPerforation => "Bowel_Perforation",
            Toxicity::BowelObstruction => "Bowel_Obstruction",
            Toxicity::Proctitis => "Proctitis",
            Toxicity::RectalFistula => "Rectal_Fistula",
            Toxicity::RectalHemorrhage => "Rectal_Hemorrhage",
            Toxicity::RectalPain => "Rectal_Pain",
            Toxicity::RectalPerforation => "Rectal_Perforation",
            Toxicity::RectalStenosis => "Rectal_Stenosis",
            Toxicity::OrganFailure => "Organ_Failure",
            Toxicity::Fatigue => "Fatigue",
            Toxicity::Pneumonitis => "Pneumonitis",
            Toxicity::Esophagitis => "Esophagitis",
        }
    }

    /// Human-readable question title.
    pub fn title(self) -> &'static str {
        match self {
            Toxicity::Cystitis => "Cystitis (CTCAE v5)",
            Toxicity::BladderPerforation => "Bladder Perforation (CTCAE v5)",
            Toxicity::Hematuria => "Hematuria (CTCAE v5)",
            Toxicity::UrinaryFistula => "Urinary Fistula (CTCAE v5)",
            Toxicity::UrinaryObstruction => "Urinary Obstruction (CTCAE v5)",
            Toxicity::UrinaryRetention => "Urinary Retention (CTCAE v5)",
            Toxicity::Diarrhea => "Diarrhea (CTCAE v5)",
            Toxicity::Nausea => "Nausea (CTCAE v5)",
            Toxicity::BowelPerforation => "Bowel Perforation (CTCAE v5)",
            Toxicity::BowelObstruction => "Bowel Obstruction (CTCAE v5)",
            Toxicity::Proctitis => "Proctitis (CTCAE v5)",
            Toxicity::RectalFistula => "Rectal Fistula (CTCAE v5)",
            Toxicity::RectalHemorrhage => "Rectal Hemorrhage (CTCAE v5)",
            Toxicity::RectalPain => "Rectal Pain (CTCAE v5)",
            Toxicity::RectalPerforation => "Rectal Perforation (CTCAE v5)",
            Toxicity::RectalStenosis => "Rectal Stenosis (CTCAE v5)",
            Toxicity::OrganFailure => "Organ Failure (CTCAE v5)",
            Toxicity::Fatigue => "Fatigue",
            Toxicity::Pneumonitis => "Pneumonitis",
            Toxicity::Esophagitis => "Esophagitis",
        }
    }

    pub fn section(self) -> SideEffectSection {
        match self {
            Toxicity::Cystitis
            | Toxicity::BladderPerforation
            | Toxicity::Hematuria
            | Toxicity::UrinaryFistula
            | Toxicity::UrinaryObstruction
            | Toxicity::UrinaryRetention => SideEffectSection::Urinary,
            Toxicity::Fatigue => SideEffectSection::Fatigue,
            Toxicity::Pneumonitis | Toxicity::Esophagitis => SideEffectSection::Other,
            _ => SideEffectSection::Gastrointestinal,
        }
    }

    /// Admissible grades in display order.
    pub fn grades(self) -> &'static [CtcaeGrade] {
        match self {
            Toxicity::BladderPerforation
            | Toxicity::UrinaryFistula
            | Toxicity::BowelPerforation
            | Toxicity::RectalPerforation => PERFORATION,
            Toxicity::RectalPain | Toxicity::Fatigue => ZERO_TO_III,
            Toxicity::OrganFailure => SEVERE_ONLY,
            _ => ZERO_TO_V,
        }
    }

    pub fn allows(self, grade: CtcaeGrade) -> bool {
        self.grades().contains(&grade)
    }

    /// Label for grade 0, as it was collected for this toxicity.
    pub fn zero_label(self) -> &'static str {
        match self {
            Toxicity::Cystitis
            | Toxicity::Fatigue
            | Toxicity::Pneumonitis
            | Toxicity::Esophagitis => "None",
            _ => "Absent",
        }
    }

    /// Stored label for a grade of this toxicity.
    pub fn label(self, grade: CtcaeGrade) -> &'static str {
        match grade {
            CtcaeGrade::Absent => self.zero_label(),
            other => other.roman(),
        }
    }

    /// Parses a stored label, accepting either zero spelling. Grades outside the admissible
    /// set are rejected.
    pub fn parse_label(self, label: &str) -> Option<CtcaeGrade> {
        let grade = match label.trim() {
            "None" | "Absent" | "0" => CtcaeGrade::Absent,
            "I" => CtcaeGrade::I,
            "II" => CtcaeGrade::II,
            "III" => CtcaeGrade::III,
            "IV" => CtcaeGrade::IV,
            "V" => CtcaeGrade::V,
            _ => return None,
        };
        self.allows(grade).then_some(grade)
    }

    /// CTCAE help text for a grade, aligned with [`Toxicity::grades`].
    pub fn description(self, grade: CtcaeGrade) -> Option<&'static str> {
        let index = self.grades().iter().position(|g| *g == grade)?;
        self.descriptions().get(index).copied()
    }

    fn descriptions(self) -> &'static [&'static str] {
        match self {
            Toxicity::Cystitis => &[
                NO_CHANGE,
                "Microscopic hematuria; minimal increase in frequency, urgency, dysuria, or nocturia; new onset of incontinence",
                "Moderate hematuria; moderate increase in frequency, urgency, dysuria, nocturia or incontinence; urinary catheter placement or bladder irrigation indicated; limiting instrumental ADL",
                "Gross hematuria; transfusion, IV medications, or hospitalization indicated; elective invasive intervention indicated",
                "Life-threatening consequences; urgent invasive intervention indicated",
                DEATH,
            ],
            Toxicity::BladderPerforation
            | Toxicity::UrinaryFistula
            | Toxicity::BowelPerforation
            | Toxicity::RectalPerforation => PERFORATION_TEXT,
            Toxicity::Hematuria => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic; urinary catheter or bladder irrigation indicated; limiting instrumental ADL",
                "Gross hematuria; transfusion, IV medications, or hospitalization indicated; elective invasive intervention indicated; limiting self care ADL",
                "Life-threatening consequences; urgent invasive intervention indicated",
                DEATH,
            ],
            Toxicity::UrinaryObstruction => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic but no hydronephrosis, sepsis, or renal dysfunction; urethral dilation, urinary or suprapubic catheter indicated",
                "Altered organ function (e.g., hydronephrosis or renal dysfunction); invasive intervention indicated",
                URGENT,
                DEATH,
            ],
            Toxicity::UrinaryRetention => &[
                NO_CHANGE,
                "Urinary, suprapubic or intermittent catheter placement not indicated; able to void with some residual",
                "Placement of urinary, suprapubic or intermittent catheter placement indicated; medication indicated",
                "Elective invasive intervention indicated; substantial loss of affected kidney function or mass",
                "Life-threatening consequences; organ failure; urgent operative intervention indicated",
                DEATH,
            ],
            Toxicity::Diarrhea => &[
                NO_CHANGE,
                "Increase of <4 stools/day over baseline; mild increase in ostomy output compared to baseline",
                "Increase of 4-6 stools/day over baseline; moderate increase in ostomy output compared to baseline; limiting instrumental ADL",
                "Increase of ≥7 stools/day over baseline; incontinence; limiting self care ADL",
                URGENT,
                DEATH,
            ],
            Toxicity::Nausea => &[
                NO_CHANGE,
                "Loss of appetite without alteration in eating habits",
                "Oral intake decreased without significant weight loss, dehydration, or malnutrition; IV fluids indicated <24 hrs",
                "Inadequate oral caloric or fluid intake; tube feeding or TPN indicated",
                URGENT,
                DEATH,
            ],
            Toxicity::BowelObstruction => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic; noninvasive intervention indicated",
                "Symptomatic; invasive intervention indicated",
                URGENT,
                DEATH,
            ],
            Toxicity::Proctitis => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic (e.g., rectal discomfort, passing blood or mucus); medical intervention indicated; limiting instrumental ADL",
                "Severe symptoms; fecal urgency or stool incontinence; limiting self care ADL",
                URGENT,
                DEATH,
            ],
            Toxicity::RectalFistula => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic, invasive intervention not indicated",
                "Symptomatic; medical intervention indicated",
                URGENT,
                DEATH,
            ],
            Toxicity::RectalHemorrhage => &[
                NO_CHANGE,
                "Minimal bleeding identified on imaging; intervention not indicated",
                "Moderate bleeding; medical intervention indicated",
                "Transfusion, radiologic, endoscopic or elective operative intervention indicated",
                URGENT,
                DEATH,
            ],
            Toxicity::RectalPain => &[
                NO_CHANGE,
                "Mild discomfort; analgesics not indicated",
                "Moderate pain; analgesics indicated; limiting instrumental ADL",
                "Severe pain; limiting self care ADL",
            ],
            Toxicity::RectalStenosis => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic; medical intervention indicated",
                "Severe symptoms; limiting self care ADL",
                URGENT,
                DEATH,
            ],
            Toxicity::OrganFailure => &[
                NO_CHANGE,
                "Shock with azotemia and acid-base disturbances; significant coagulation abnormalities",
                "Life-threatening consequences (e.g., vasopressor dependent and oliguric or anuric or ischemic colitis or lactic acidosis)",
                DEATH,
            ],
            Toxicity::Fatigue => &[
                "No fatigue",
                "Mild fatigue; no change in activity",
                "Moderate fatigue; limiting instrumental ADL",
                "Severe fatigue; limiting self care ADL",
            ],
            Toxicity::Pneumonitis => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic; medical intervention indicated but not limiting instrumental ADL",
                "Severe symptoms; limiting self care ADL, O2 indicated",
                "Life-threatening respiratory compromise; urgent intervention indicated",
                DEATH,
            ],
            Toxicity::Esophagitis => &[
                NO_CHANGE,
                OBSERVATION_ONLY,
                "Symptomatic; altered eating/swallowing; oral supplements indicated",
                "Severely altered eating/swallowing; tube feeding, TPN, or hospitalization indicated",
                "Life-threatening consequences; urgent operative intervention indicated",
                DEATH,
            ],
        }
    }
}

/// Grades for every toxicity. Toxicities never graded read as grade 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Toxicity, CtcaeGrade>", into = "BTreeMap<Toxicity, CtcaeGrade>")]
pub struct ToxicityGrades(BTreeMap<Toxicity, CtcaeGrade>);

impl ToxicityGrades {
    pub fn get(&self, toxicity: Toxicity) -> CtcaeGrade {
        self.0.get(&toxicity).copied().unwrap_or_default()
    }

    /// Records a grade, refusing grades the toxicity does not admit.
    pub fn set(&mut self, toxicity: Toxicity, grade: CtcaeGrade) -> Result<(), String> {
        if !toxicity.allows(grade) {
            return Err(format!(
                "{} does not admit grade {}",
                toxicity.column(),
                grade.roman()
            ));
        }
        // grade 0 is the implicit value; keep the map free of it so equality is by grade
        if grade == CtcaeGrade::Absent {
            self.0.remove(&toxicity);
        } else {
            self.0.insert(toxicity, grade);
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<Toxicity, CtcaeGrade>> for ToxicityGrades {
    type Error = String;

    fn try_from(map: BTreeMap<Toxicity, CtcaeGrade>) -> Result<Self, Self::Error> {
        let mut grades = ToxicityGrades::default();
        for (toxicity, grade) in map {
            grades.set(toxicity, grade)?;
        }
        Ok(grades)
    }
}

impl From<ToxicityGrades> for BTreeMap<Toxicity, CtcaeGrade> {
    fn from(grades: ToxicityGrades) -> Self {
        Toxicity::ALL.iter().map(|t| (*t, grades.get(*t))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_toxicity_has_help_text_for_every_grade() {
        for toxicity in Toxicity::ALL {
            assert_eq!(
                toxicity.grades().len(),
                toxicity.descriptions().len(),
                "description count mismatch for {}",
                toxicity.column()
            );
        }
    }

    #[test]
    fn zero_label_depends_on_toxicity() {
        assert_eq!(Toxicity::Cystitis.label(CtcaeGrade::Absent), "None");
        assert_eq!(Toxicity::Hematuria.label(CtcaeGrade::Absent), "Absent");
        assert_eq!(Toxicity::Hematuria.label(CtcaeGrade::III), "III");
    }

    #[test]
    fn parse_label_accepts_either_zero_spelling() {
        assert_eq!(
            Toxicity::Cystitis.parse_label("Absent"),
            Some(CtcaeGrade::Absent)
        );
        assert_eq!(
            Toxicity::Nausea.parse_label("None"),
            Some(CtcaeGrade::Absent)
        );
    }

    #[test]
    fn parse_label_rejects_inadmissible_grades() {
        assert_eq!(Toxicity::BladderPerforation.parse_label("I"), None);
        assert_eq!(Toxicity::Fatigue.parse_label("IV"), None);
        assert_eq!(Toxicity::OrganFailure.parse_label("II"), None);
        assert_eq!(
            Toxicity::OrganFailure.parse_label("III"),
            Some(CtcaeGrade::III)
        );
    }

    #[test]
    fn grades_default_to_zero_and_refuse_inadmissible() {
        let mut grades = ToxicityGrades::default();
        assert_eq!(grades.get(Toxicity::Diarrhea), CtcaeGrade::Absent);

        grades
            .set(Toxicity::Diarrhea, CtcaeGrade::II)
            .expect("diarrhea admits grade II");
        assert_eq!(grades.get(Toxicity::Diarrhea), CtcaeGrade::II);

        let err = grades
            .set(Toxicity::RectalPain, CtcaeGrade::V)
            .expect_err("rectal pain stops at III");
        assert!(err.contains("Rectal_Pain"));
    }

    #[test]
    fn yaml_map_is_validated() {
        let ok: ToxicityGrades = serde_yaml::from_str("Cystitis: None\nDiarrhea: II\n").unwrap();
        assert_eq!(ok.get(Toxicity::Diarrhea), CtcaeGrade::II);
        assert_eq!(ok.get(Toxicity::Cystitis), CtcaeGrade::Absent);

        let err = serde_yaml::from_str::<ToxicityGrades>("Bladder_Perforation: I\n");
        assert!(err.is_err(), "grade I is not admissible for perforation");
    }

    #[test]
    fn sections_cover_form_layout() {
        assert_eq!(Toxicity::Cystitis.section(), SideEffectSection::Urinary);
        assert_eq!(
            Toxicity::OrganFailure.section(),
            SideEffectSection::Gastrointestinal
        );
        assert_eq!(Toxicity::Fatigue.section(), SideEffectSection::Fatigue);
        assert_eq!(Toxicity::Esophagitis.section(), SideEffectSection::Other);
    }
}
