//! DRDP reference taxonomy: domains, measures and developmental levels.
//!
//! The catalog is compiled in and never mutated. Each assessment type has its
//! own domain list and its own ordered level scale; ordinals from different
//! scales must not be compared.

use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    PreschoolTk,
    Kindergarten,
}

impl AssessmentType {
    pub const ALL: [AssessmentType; 2] = [Self::PreschoolTk, Self::Kindergarten];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preschool_tk" | "preschool-tk" | "preschool" | "tk" => Some(Self::PreschoolTk),
            "kindergarten" | "k" => Some(Self::Kindergarten),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreschoolTk => "preschool_tk",
            Self::Kindergarten => "kindergarten",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PreschoolTk => "DRDP Preschool / Transitional Kindergarten",
            Self::Kindergarten => "DRDP Kindergarten",
        }
    }

    /// Kindergarten grades get the K instrument; everything else uses the
    /// preschool/TK instrument.
    pub fn for_grade(grade: &str) -> Self {
        match grade.trim().to_ascii_lowercase().as_str() {
            "k" | "kinder" | "kindergarten" => Self::Kindergarten,
            _ => Self::PreschoolTk,
        }
    }

    pub fn domains(self) -> &'static [DomainDef] {
        match self {
            Self::PreschoolTk => PRESCHOOL_TK_DOMAINS,
            Self::Kindergarten => KINDERGARTEN_DOMAINS,
        }
    }

    pub fn levels(self) -> &'static [LevelDef] {
        match self {
            Self::PreschoolTk => PRESCHOOL_TK_LEVELS,
            Self::Kindergarten => KINDERGARTEN_LEVELS,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct LevelDef {
    pub id: &'static str,
    pub name: &'static str,
    pub ordinal: u8,
}

#[derive(Debug, PartialEq, Eq)]
pub struct MeasureDef {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DomainDef {
    pub id: &'static str,
    pub name: &'static str,
    pub measures: &'static [MeasureDef],
}

/// What comes after a rated level on its scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Level(&'static LevelDef),
    /// The rated level is the top of the scale.
    Advanced,
}

impl NextStep {
    pub fn id(self) -> &'static str {
        match self {
            Self::Level(l) => l.id,
            Self::Advanced => "advanced",
        }
    }
}

pub fn measures(kind: AssessmentType) -> impl Iterator<Item = (&'static DomainDef, &'static MeasureDef)> {
    kind.domains()
        .iter()
        .flat_map(|d| d.measures.iter().map(move |m| (d, m)))
}

pub fn total_measures(kind: AssessmentType) -> usize {
    kind.domains().iter().map(|d| d.measures.len()).sum()
}

pub fn find_measure(
    kind: AssessmentType,
    measure_id: &str,
) -> Option<(&'static DomainDef, &'static MeasureDef)> {
    measures(kind).find(|(_, m)| m.code.eq_ignore_ascii_case(measure_id.trim()))
}

/// Index of a measure in reference order (domains, then measures as listed).
pub fn measure_position(kind: AssessmentType, measure_id: &str) -> Option<usize> {
    measures(kind).position(|(_, m)| m.code == measure_id)
}

pub fn find_level(kind: AssessmentType, level_id: &str) -> Option<&'static LevelDef> {
    let wanted = level_id.trim();
    kind.levels()
        .iter()
        .find(|l| l.id.eq_ignore_ascii_case(wanted))
}

pub fn next_level(kind: AssessmentType, level_id: &str) -> Option<NextStep> {
    let levels = kind.levels();
    let idx = levels.iter().position(|l| l.id == level_id)?;
    Some(match levels.get(idx + 1) {
        Some(next) => NextStep::Level(next),
        None => NextStep::Advanced,
    })
}

pub fn level_json(level: &LevelDef) -> serde_json::Value {
    json!({
        "id": level.id,
        "name": level.name,
        "ordinal": level.ordinal,
    })
}

pub fn measure_json(domain: &DomainDef, measure: &MeasureDef) -> serde_json::Value {
    json!({
        "id": measure.code,
        "domainId": domain.id,
        "code": measure.code,
        "name": measure.name,
        "description": measure.description,
    })
}

pub fn domain_json(domain: &DomainDef) -> serde_json::Value {
    let measures: Vec<_> = domain
        .measures
        .iter()
        .map(|m| measure_json(domain, m))
        .collect();
    json!({
        "id": domain.id,
        "name": domain.name,
        "measures": measures,
    })
}

const fn level(id: &'static str, name: &'static str, ordinal: u8) -> LevelDef {
    LevelDef { id, name, ordinal }
}

const fn m(code: &'static str, name: &'static str, description: &'static str) -> MeasureDef {
    MeasureDef {
        code,
        name,
        description,
    }
}

static PRESCHOOL_TK_LEVELS: &[LevelDef] = &[
    level("responding-earlier", "Responding Earlier", 1),
    level("responding-later", "Responding Later", 2),
    level("exploring-earlier", "Exploring Earlier", 3),
    level("exploring-middle", "Exploring Middle", 4),
    level("exploring-later", "Exploring Later", 5),
    level("building-earlier", "Building Earlier", 6),
    level("building-middle", "Building Middle", 7),
    level("building-later", "Building Later", 8),
    level("integrating-earlier", "Integrating Earlier", 9),
    level("integrating-later", "Integrating Later", 10),
];

static KINDERGARTEN_LEVELS: &[LevelDef] = &[
    level("exploring-earlier", "Exploring Earlier", 1),
    level("exploring-middle", "Exploring Middle", 2),
    level("exploring-later", "Exploring Later", 3),
    level("building-earlier", "Building Earlier", 4),
    level("building-middle", "Building Middle", 5),
    level("building-later", "Building Later", 6),
    level("integrating-earlier", "Integrating Earlier", 7),
    level("integrating-middle", "Integrating Middle", 8),
    level("integrating-later", "Integrating Later", 9),
];

const ATL_REG: &[MeasureDef] = &[
    m("ATL-REG-1", "Attention Maintenance", "Child develops the capacity to pay attention to people, things, or events"),
    m("ATL-REG-2", "Self-Comforting", "Child develops strategies to comfort self and regain composure"),
    m("ATL-REG-3", "Imitation", "Child mirrors, repeats, and practices the actions or words of others"),
    m("ATL-REG-4", "Curiosity and Initiative in Learning", "Child explores the environment in increasingly focused ways to learn about people, things, materials, and events"),
    m("ATL-REG-5", "Self-Control of Feelings and Behavior", "Child increasingly manages own feelings and behavior with support of familiar adults"),
    m("ATL-REG-6", "Engagement and Persistence", "Child increasingly persists in understanding and mastering activities, even if they are challenging"),
    m("ATL-REG-7", "Shared Use of Space and Materials", "Child develops the ability to share the use of space and materials with others"),
];

const SED: &[MeasureDef] = &[
    m("SED-1", "Identity of Self in Relation to Others", "Child shows increasing awareness of self as distinct from and also related to others"),
    m("SED-2", "Social and Emotional Understanding", "Child shows developing understanding of people's behaviors, feelings, thoughts, and individual characteristics"),
    m("SED-3", "Relationships and Social Interactions with Familiar Adults", "Child develops close relationships with one or more familiar adults and interacts in an increasingly competent and cooperative manner"),
    m("SED-4", "Relationships and Social Interactions with Peers", "Child becomes increasingly competent and cooperative in interactions with peers and develops friendships"),
    m("SED-5", "Symbolic and Sociodramatic Play", "Child develops the capacity to use objects to represent other objects and engages in pretend play"),
];

const LLD: &[MeasureDef] = &[
    m("LLD-1", "Understanding of Language (Receptive)", "Child understands increasingly complex communication and language"),
    m("LLD-2", "Responsiveness to Language", "Child responds to increasingly complex language"),
    m("LLD-3", "Communication and Use of Language (Expressive)", "Child's communication develops from nonverbal communication to using language with increasingly complex words and sentences"),
    m("LLD-4", "Reciprocal Communication and Conversation", "Child engages in back-and-forth communication that develops into increasingly extended conversations"),
    m("LLD-5", "Interest in Literacy", "Child shows interest in books, songs, rhymes, stories, and other literacy activities in increasingly complex ways"),
    m("LLD-6", "Comprehension and Analysis of Age-Appropriate Text", "Child develops capacity to understand and analyze stories and other information from text"),
    m("LLD-7", "Concepts About Print", "Child develops understanding that print conveys meaning and develops knowledge of print conventions"),
    m("LLD-8", "Phonological Awareness", "Child develops awareness that words are made up of smaller units of sound"),
    m("LLD-9", "Letter and Word Knowledge", "Child develops awareness of letters of the alphabet and their sounds"),
    m("LLD-10", "Emergent Writing", "Child develops capacity to write letters, words, and messages to communicate"),
];

const ELD: &[MeasureDef] = &[
    m("ELD-1", "Comprehension of English (Receptive English)", "Child shows increasing progress toward fluency in understanding English"),
    m("ELD-2", "Self-Expression in English (Expressive English)", "Child shows increasing progress toward fluency in speaking English"),
    m("ELD-3", "Understanding and Response to English Literacy Activities", "Child shows an increasing understanding of and response to books, stories, songs, and poems in English"),
    m("ELD-4", "Symbol, Letter, and Print Knowledge in English", "Child shows increasing understanding that print in English carries meaning"),
];

const COG: &[MeasureDef] = &[
    m("COG-1", "Spatial Relationships", "Child increasingly shows understanding of how objects move in space or fit in different spaces"),
    m("COG-2", "Classification", "Child shows increasing ability to compare, match, and sort objects into groups according to their attributes"),
    m("COG-3", "Number Sense of Quantity", "Child shows developing understanding of number and quantity"),
    m("COG-4", "Number Sense of Math Operations", "Child shows increasing ability to add and subtract small quantities of objects"),
    m("COG-5", "Measurement", "Child shows increasing understanding of measurable properties and of comparing objects by those properties"),
    m("COG-6", "Patterning", "Child shows increasing ability to recognize, reproduce, and create patterns of increasing complexity"),
    m("COG-7", "Shapes", "Child shows increasing knowledge of shapes and their characteristics"),
    m("COG-8", "Cause and Effect", "Child shows increasing awareness of cause-and-effect relationships"),
    m("COG-9", "Inquiry Through Observation and Investigation", "Child observes and investigates objects and events in the environment"),
    m("COG-10", "Documentation and Communication of Inquiry", "Child records and shares observations and findings"),
    m("COG-11", "Knowledge of the Natural World", "Child shows developing knowledge of living things and of natural objects and events"),
];

const PD_HLTH: &[MeasureDef] = &[
    m("PD-HLTH-1", "Perceptual-Motor Skills and Movement Concepts", "Child shows increasing awareness of own body and of movement in space"),
    m("PD-HLTH-2", "Gross Locomotor Movement Skills", "Child shows increasing proficiency in gross locomotor movements such as walking and running"),
    m("PD-HLTH-3", "Gross Motor Manipulative Skills", "Child shows increasing coordination of large muscles to manipulate objects"),
    m("PD-HLTH-4", "Fine Motor Manipulative Skills", "Child shows increasing coordination of small muscles to manipulate objects"),
    m("PD-HLTH-5", "Safety", "Child shows increasing awareness of safety and increasing ability to manage risk"),
    m("PD-HLTH-6", "Personal Care Routines: Hygiene", "Child shows increasing independence in hygiene routines"),
    m("PD-HLTH-7", "Personal Care Routines: Feeding", "Child shows increasing independence in feeding"),
    m("PD-HLTH-8", "Personal Care Routines: Dressing", "Child shows increasing independence in dressing"),
    m("PD-HLTH-9", "Active Physical Play", "Child engages in active physical play of increasing intensity and duration"),
    m("PD-HLTH-10", "Nutrition", "Child shows increasing knowledge of nutritious food choices"),
];

const HSS: &[MeasureDef] = &[
    m("HSS-1", "Sense of Time", "Child shows increasing understanding of the sequence of events and of past, present, and future"),
    m("HSS-2", "Sense of Place", "Child shows increasing awareness of the physical characteristics of places"),
    m("HSS-3", "Ecology", "Child shows increasing awareness of the relationship between people and the environment"),
    m("HSS-4", "Conflict Negotiation", "Child shows increasing ability to resolve conflicts with peers"),
    m("HSS-5", "Responsible Conduct as a Group Member", "Child shows increasing ability to follow rules and take responsibility within a group"),
];

const VPA: &[MeasureDef] = &[
    m("VPA-1", "Visual Art", "Child explores and expresses self through visual art"),
    m("VPA-2", "Music", "Child explores and expresses self through music"),
    m("VPA-3", "Drama", "Child explores and expresses self through drama"),
    m("VPA-4", "Dance", "Child explores and expresses self through dance"),
];

const MATH: &[MeasureDef] = &[
    m("MATH-1", "Classification", "Child compares, sorts, and classifies objects by one or more attributes"),
    m("MATH-2", "Number Sense of Quantity", "Child counts and compares quantities with increasing accuracy"),
    m("MATH-3", "Number Sense of Math Operations", "Child adds and subtracts quantities and explains strategies"),
    m("MATH-4", "Measurement", "Child measures and compares objects using standard and nonstandard units"),
    m("MATH-5", "Patterning", "Child recognizes, extends, and creates patterns and describes the rule"),
    m("MATH-6", "Shapes", "Child identifies, describes, and composes two- and three-dimensional shapes"),
    m("MATH-7", "Spatial Relationships", "Child describes positions and relative locations of objects in space"),
];

const SCI: &[MeasureDef] = &[
    m("SCI-1", "Cause and Effect", "Child predicts and explains the results of actions and events"),
    m("SCI-2", "Inquiry Through Observation and Investigation", "Child plans and carries out simple investigations"),
    m("SCI-3", "Documentation and Communication of Inquiry", "Child records, compares, and communicates findings"),
    m("SCI-4", "Knowledge of the Natural World", "Child describes characteristics of living things, earth materials, and natural events"),
];

const PD: &[MeasureDef] = &[
    m("PD-1", "Perceptual-Motor Skills and Movement Concepts", "Child moves with increasing body awareness and spatial awareness"),
    m("PD-2", "Gross Locomotor Movement Skills", "Child performs increasingly coordinated locomotor movements"),
    m("PD-3", "Gross Motor Manipulative Skills", "Child throws, catches, and kicks with increasing control"),
    m("PD-4", "Fine Motor Manipulative Skills", "Child uses hands and fingers with increasing precision"),
];

const HLTH: &[MeasureDef] = &[
    m("HLTH-1", "Safety", "Child follows safety rules and explains their purpose"),
    m("HLTH-2", "Personal Care Routines: Hygiene", "Child carries out hygiene routines independently"),
    m("HLTH-3", "Personal Care Routines: Feeding", "Child serves and feeds self independently"),
    m("HLTH-4", "Personal Care Routines: Dressing", "Child dresses and undresses independently"),
    m("HLTH-5", "Active Physical Play", "Child sustains vigorous physical activity"),
    m("HLTH-6", "Nutrition", "Child identifies healthy foods and explains their benefits"),
];

const SPAN: &[MeasureDef] = &[
    m("SPAN-1", "Comprehension of Spanish (Receptive Spanish)", "Child shows increasing understanding of Spanish"),
    m("SPAN-2", "Self-Expression in Spanish (Expressive Spanish)", "Child shows increasing fluency in speaking Spanish"),
    m("SPAN-3", "Understanding and Response to Literacy Activities in Spanish", "Child responds to books, stories, songs, and poems in Spanish"),
    m("SPAN-4", "Symbol, Letter, and Print Knowledge in Spanish", "Child shows increasing understanding that print in Spanish carries meaning"),
];

static PRESCHOOL_TK_DOMAINS: &[DomainDef] = &[
    DomainDef { id: "ATL-REG", name: "Approaches to Learning - Self-Regulation", measures: ATL_REG },
    DomainDef { id: "SED", name: "Social and Emotional Development", measures: SED },
    DomainDef { id: "LLD", name: "Language and Literacy Development", measures: LLD },
    DomainDef { id: "ELD", name: "English Language Development", measures: ELD },
    DomainDef { id: "COG", name: "Cognition, Including Math and Science", measures: COG },
    DomainDef { id: "PD-HLTH", name: "Physical Development - Health", measures: PD_HLTH },
    DomainDef { id: "HSS", name: "History - Social Science", measures: HSS },
    DomainDef { id: "VPA", name: "Visual and Performing Arts", measures: VPA },
];

static KINDERGARTEN_DOMAINS: &[DomainDef] = &[
    DomainDef { id: "ATL-REG", name: "Approaches to Learning - Self-Regulation", measures: ATL_REG },
    DomainDef { id: "SED", name: "Social and Emotional Development", measures: SED },
    DomainDef { id: "LLD", name: "Language and Literacy Development", measures: LLD },
    DomainDef { id: "ELD", name: "English Language Development", measures: ELD },
    DomainDef { id: "MATH", name: "Cognition: Math", measures: MATH },
    DomainDef { id: "SCI", name: "Cognition: Science", measures: SCI },
    DomainDef { id: "PD", name: "Physical Development", measures: PD },
    DomainDef { id: "HLTH", name: "Health", measures: HLTH },
    DomainDef { id: "HSS", name: "History - Social Science", measures: HSS },
    DomainDef { id: "VPA", name: "Visual and Performing Arts", measures: VPA },
    DomainDef { id: "SPAN", name: "Spanish Language Development", measures: SPAN },
];
