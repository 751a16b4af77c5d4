//! Report models built from an assessment's stored ratings.
//!
//! Everything here is a pure function of an [`AssessmentDetail`] plus the
//! static tables below: a per-domain template set and the taxonomy's
//! "current level -> next level" lookup. Nothing is persisted.

use crate::assessments::AssessmentDetail;
use crate::assessments::Progress;
use crate::ratings::Rating;
use crate::taxonomy::{self, AssessmentType, NextStep};
use serde::Serialize;

struct DomainTemplates {
    domains: &'static [&'static str],
    target: &'static str,
    advanced: &'static str,
    iep: &'static str,
}

/// ELD and SPAN have no entry: no learning target is produced
/// for those measures and IEP goals fall back to [`GENERIC_IEP`].
static TEMPLATES: &[DomainTemplates] = &[
    DomainTemplates {
        domains: &["ATL-REG"],
        target: "By {timeframe}, {student} will show {measure} at the {next} level, moving on from {current}, with adult support during play and transitions.",
        advanced: "By {timeframe}, {student} will sustain {measure} at the {current} level across new settings and longer, more demanding activities.",
        iep: "By {timeframe}, with visual supports and adult modeling, {student} will demonstrate {measure} at the {next} level in 4 out of 5 observed opportunities.",
    },
    DomainTemplates {
        domains: &["SED"],
        target: "By {timeframe}, {student} will demonstrate {measure} at the {next} level, moving on from {current}, in interactions with adults and peers.",
        advanced: "By {timeframe}, {student} will extend {measure} beyond the {current} level by leading cooperative play and supporting peers.",
        iep: "By {timeframe}, given social narratives and guided practice, {student} will demonstrate {measure} at the {next} level in 4 out of 5 observed peer interactions.",
    },
    DomainTemplates {
        domains: &["LLD"],
        target: "By {timeframe}, {student} will demonstrate {measure} at the {next} level, moving on from {current}, through shared reading, conversation and writing activities.",
        advanced: "By {timeframe}, {student} will apply {measure} beyond the {current} level with more complex texts and extended conversations.",
        iep: "By {timeframe}, given modeling and repeated practice, {student} will demonstrate {measure} at the {next} level in 4 out of 5 literacy activities.",
    },
    DomainTemplates {
        domains: &["COG", "MATH", "SCI"],
        target: "By {timeframe}, {student} will demonstrate {measure} at the {next} level, moving on from {current}, using hands-on materials and everyday problems.",
        advanced: "By {timeframe}, {student} will apply {measure} beyond the {current} level by explaining reasoning and solving multi-step problems.",
        iep: "By {timeframe}, given manipulatives and guided questions, {student} will demonstrate {measure} at the {next} level in 4 out of 5 trials.",
    },
    DomainTemplates {
        domains: &["PD-HLTH", "PD", "HLTH"],
        target: "By {timeframe}, {student} will demonstrate {measure} at the {next} level, moving on from {current}, during daily routines and active play.",
        advanced: "By {timeframe}, {student} will refine {measure} beyond the {current} level in more challenging physical and self-care tasks.",
        iep: "By {timeframe}, with physical prompts faded to independence, {student} will demonstrate {measure} at the {next} level in 4 out of 5 routines.",
    },
    DomainTemplates {
        domains: &["HSS"],
        target: "By {timeframe}, {student} will demonstrate {measure} at the {next} level, moving on from {current}, during group activities and classroom routines.",
        advanced: "By {timeframe}, {student} will extend {measure} beyond the {current} level by taking responsibility within the classroom community.",
        iep: "By {timeframe}, with adult facilitation, {student} will demonstrate {measure} at the {next} level in 4 out of 5 group activities.",
    },
    DomainTemplates {
        domains: &["VPA"],
        target: "By {timeframe}, {student} will demonstrate {measure} at the {next} level, moving on from {current}, through open-ended creative activities.",
        advanced: "By {timeframe}, {student} will extend {measure} beyond the {current} level by planning and sharing original work.",
        iep: "By {timeframe}, given a choice of materials, {student} will demonstrate {measure} at the {next} level in 4 out of 5 creative activities.",
    },
];

const GENERIC_IEP: &str = "By {timeframe}, with individualized support, {student} will demonstrate {measure} at the {next} level in 4 out of 5 observed opportunities.";

const ADVANCED_LABEL: &str = "Advanced";

fn templates_for(domain_id: &str) -> Option<&'static DomainTemplates> {
    TEMPLATES.iter().find(|t| t.domains.contains(&domain_id))
}

struct Fill<'a> {
    student: &'a str,
    timeframe: &'a str,
    measure: &'a str,
    current: &'a str,
    next: &'a str,
}

impl Fill<'_> {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "student" => Some(self.student),
            "timeframe" => Some(self.timeframe),
            "measure" => Some(self.measure),
            "current" => Some(self.current),
            "next" => Some(self.next),
            _ => None,
        }
    }
}

/// Single pass over the template: substituted values are never rescanned,
/// and unknown `{...}` sequences are copied through.
fn fill(template: &str, f: &Fill<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}').and_then(|close| f.lookup(&after[..close]).map(|v| (close, v))) {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn next_label(step: NextStep) -> &'static str {
    match step {
        NextStep::Level(l) => l.name,
        NextStep::Advanced => ADVANCED_LABEL,
    }
}

fn student_name(detail: &AssessmentDetail) -> String {
    detail
        .student
        .first_name
        .clone()
        .unwrap_or_else(|| "the student".to_string())
}

pub fn default_timeframe(detail: &AssessmentDetail) -> String {
    format!(
        "the end of the {} assessment period",
        detail.assessment.assessment_period.as_str()
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningTarget {
    pub measure_id: String,
    pub measure_name: String,
    pub domain_id: String,
    pub current_level: String,
    /// Next level id, or `"advanced"` at the top of the scale.
    pub next_level: String,
    pub text: String,
}

/// One target per rated measure whose domain has a template set, in
/// reference order.
pub fn learning_targets(detail: &AssessmentDetail, timeframe: &str) -> Vec<LearningTarget> {
    let kind = detail.assessment.assessment_type;
    let student = student_name(detail);
    detail
        .ratings
        .iter()
        .filter_map(|r| {
            let templates = templates_for(&r.domain_id)?;
            let step = taxonomy::next_level(kind, &r.developmental_level_id)?;
            let template = match step {
                NextStep::Level(_) => templates.target,
                NextStep::Advanced => templates.advanced,
            };
            let text = fill(
                template,
                &Fill {
                    student: &student,
                    timeframe,
                    measure: &r.measure_name,
                    current: &r.level_name,
                    next: next_label(step),
                },
            );
            Some(LearningTarget {
                measure_id: r.measure_id.clone(),
                measure_name: r.measure_name.clone(),
                domain_id: r.domain_id.clone(),
                current_level: r.developmental_level_id.clone(),
                next_level: step.id().to_string(),
                text,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IepGoal {
    pub measure_id: String,
    pub measure_name: String,
    pub domain_id: String,
    pub current_level: String,
    pub level_ordinal: u8,
    pub next_level: String,
    pub text: String,
}

/// Highest level ordinal wins; on a tie the first rating in reference order
/// is kept.
fn top_rating(ratings: &[Rating]) -> Option<&Rating> {
    let mut best: Option<&Rating> = None;
    for r in ratings {
        if best.map(|b| r.level_ordinal > b.level_ordinal).unwrap_or(true) {
            best = Some(r);
        }
    }
    best
}

pub fn iep_goal(detail: &AssessmentDetail, timeframe: &str) -> Option<IepGoal> {
    let kind = detail.assessment.assessment_type;
    let top = top_rating(&detail.ratings)?;
    let step = taxonomy::next_level(kind, &top.developmental_level_id)?;
    let template = templates_for(&top.domain_id)
        .map(|t| t.iep)
        .unwrap_or(GENERIC_IEP);
    let student = student_name(detail);
    let text = fill(
        template,
        &Fill {
            student: &student,
            timeframe,
            measure: &top.measure_name,
            current: &top.level_name,
            next: next_label(step),
        },
    );
    Some(IepGoal {
        measure_id: top.measure_id.clone(),
        measure_name: top.measure_name.clone(),
        domain_id: top.domain_id.clone(),
        current_level: top.developmental_level_id.clone(),
        level_ordinal: top.level_ordinal,
        next_level: step.id().to_string(),
        text,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub level_id: &'static str,
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub domain_id: &'static str,
    pub name: &'static str,
    pub rated_count: usize,
    pub total_measures: usize,
    pub average_ordinal: Option<f64>,
    pub level_counts: Vec<LevelCount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub assessment_id: String,
    pub assessment_type: AssessmentType,
    pub progress: Progress,
    pub domains: Vec<DomainSummary>,
}

pub fn summarize(detail: &AssessmentDetail) -> AssessmentSummary {
    let kind = detail.assessment.assessment_type;
    let domains = kind
        .domains()
        .iter()
        .map(|d| {
            let rated: Vec<&Rating> = detail
                .ratings
                .iter()
                .filter(|r| r.domain_id == d.id)
                .collect();
            let average_ordinal = if rated.is_empty() {
                None
            } else {
                let sum: f64 = rated.iter().map(|r| f64::from(r.level_ordinal)).sum();
                Some(((sum / rated.len() as f64) * 10.0).round() / 10.0)
            };
            let level_counts = kind
                .levels()
                .iter()
                .map(|l| LevelCount {
                    level_id: l.id,
                    name: l.name,
                    count: rated
                        .iter()
                        .filter(|r| r.developmental_level_id == l.id)
                        .count(),
                })
                .collect();
            DomainSummary {
                domain_id: d.id,
                name: d.name,
                rated_count: rated.len(),
                total_measures: d.measures.len(),
                average_ordinal,
                level_counts,
            }
        })
        .collect();

    AssessmentSummary {
        assessment_id: detail.assessment.id.clone(),
        assessment_type: kind,
        progress: Progress::compute(kind, detail.ratings.len()),
        domains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessments::{Assessment, Period, Status, StudentSummary};

    fn rating(kind: AssessmentType, measure: &str, level: &str) -> Rating {
        let (d, m) = taxonomy::find_measure(kind, measure).expect("measure");
        let l = taxonomy::find_level(kind, level).expect("level");
        Rating {
            id: format!("r-{}", measure),
            assessment_id: "a1".into(),
            measure_id: m.code.into(),
            measure_name: m.name.into(),
            domain_id: d.id.into(),
            developmental_level_id: l.id.into(),
            level_name: l.name.into(),
            level_ordinal: l.ordinal,
            observation_notes: None,
            created_at: String::new(),
            updated_at: String::new(),
            observations: Vec::new(),
        }
    }

    fn detail(kind: AssessmentType, ratings: Vec<Rating>) -> AssessmentDetail {
        AssessmentDetail {
            assessment: Assessment {
                id: "a1".into(),
                student_id: "s1".into(),
                assessment_type: kind,
                assessment_date: "2024-09-15".into(),
                assessment_period: Period::Fall,
                status: Status::InProgress,
                notes: None,
                created_at: String::new(),
                updated_at: String::new(),
                progress: Progress::compute(kind, ratings.len()),
            },
            student: StudentSummary {
                id: "s1".into(),
                display_name: "Jane Doe".into(),
                first_name: Some("Jane".into()),
                grade: Some("K".into()),
                class_name: None,
                missing: false,
            },
            ratings,
        }
    }

    #[test]
    fn target_uses_next_level_and_fills_every_placeholder() {
        let k = AssessmentType::Kindergarten;
        let d = detail(k, vec![rating(k, "LLD-9", "building-earlier")]);
        let targets = learning_targets(&d, "June");
        assert_eq!(targets.len(), 1);
        let t = &targets[0];
        assert_eq!(t.next_level, "building-middle");
        assert!(t.text.starts_with("By June, Jane will demonstrate Letter and Word Knowledge at the Building Middle level"));
        assert!(!t.text.contains('{'), "{}", t.text);
    }

    #[test]
    fn terminal_level_maps_to_advanced() {
        let k = AssessmentType::Kindergarten;
        let d = detail(k, vec![rating(k, "MATH-2", "integrating-later")]);
        let targets = learning_targets(&d, "June");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].next_level, "advanced");
        assert!(targets[0].text.contains("beyond the Integrating Later level"));

        let p = AssessmentType::PreschoolTk;
        let d = detail(p, vec![rating(p, "COG-3", "integrating-later")]);
        assert_eq!(learning_targets(&d, "June")[0].next_level, "advanced");
    }

    #[test]
    fn domains_without_templates_produce_no_target() {
        let k = AssessmentType::Kindergarten;
        let d = detail(
            k,
            vec![
                rating(k, "LLD-1", "exploring-later"),
                rating(k, "ELD-1", "building-earlier"),
                rating(k, "SPAN-1", "building-earlier"),
            ],
        );
        let targets = learning_targets(&d, "June");
        let ids: Vec<_> = targets.iter().map(|t| t.measure_id.as_str()).collect();
        assert_eq!(ids, vec!["LLD-1"]);
    }

    #[test]
    fn iep_goal_picks_highest_level_with_first_occurrence_tie_break() {
        let k = AssessmentType::Kindergarten;
        let d = detail(
            k,
            vec![
                rating(k, "SED-1", "exploring-later"),
                rating(k, "LLD-2", "building-later"),
                rating(k, "MATH-3", "building-later"),
            ],
        );
        let goal = iep_goal(&d, "June").expect("goal");
        assert_eq!(goal.measure_id, "LLD-2");
        assert_eq!(goal.next_level, "integrating-earlier");
        assert!(goal.text.contains("literacy activities"));
        assert!(iep_goal(&detail(k, Vec::new()), "June").is_none());
    }

    #[test]
    fn iep_goal_falls_back_to_generic_template() {
        let k = AssessmentType::Kindergarten;
        let d = detail(k, vec![rating(k, "ELD-2", "integrating-later")]);
        let goal = iep_goal(&d, "June").expect("goal");
        assert_eq!(goal.next_level, "advanced");
        assert!(goal.text.contains("with individualized support"));
        assert!(goal.text.contains("at the Advanced level"));
    }

    #[test]
    fn missing_student_reads_as_the_student() {
        let k = AssessmentType::Kindergarten;
        let mut d = detail(k, vec![rating(k, "LLD-9", "building-earlier")]);
        d.student.first_name = None;
        let targets = learning_targets(&d, "June");
        assert!(targets[0].text.starts_with("By June, the student will"));
        assert_eq!(default_timeframe(&d), "the end of the Fall assessment period");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let f = Fill {
            student: "{timeframe}",
            timeframe: "June",
            measure: "m",
            current: "c",
            next: "n",
        };
        assert_eq!(fill("By {timeframe}, {student} will", &f), "By June, {timeframe} will");
        assert_eq!(fill("{unknown} {next", &f), "{unknown} {next");

        let k = AssessmentType::Kindergarten;
        let d = detail(k, vec![rating(k, "LLD-9", "building-earlier")]);
        let targets = learning_targets(&d, "{next}");
        assert!(targets[0].text.starts_with("By {next}, Jane"), "{}", targets[0].text);
    }

    #[test]
    fn summary_counts_per_domain_in_reference_order() {
        let k = AssessmentType::Kindergarten;
        let d = detail(
            k,
            vec![
                rating(k, "LLD-1", "building-earlier"),
                rating(k, "LLD-2", "building-later"),
                rating(k, "MATH-1", "exploring-middle"),
            ],
        );
        let s = summarize(&d);
        assert_eq!(s.domains.len(), 11);
        assert_eq!(s.domains[0].domain_id, "ATL-REG");
        let lld = s.domains.iter().find(|x| x.domain_id == "LLD").expect("LLD");
        assert_eq!(lld.rated_count, 2);
        assert_eq!(lld.total_measures, 10);
        assert_eq!(lld.average_ordinal, Some(5.0));
        let be = lld
            .level_counts
            .iter()
            .find(|c| c.level_id == "building-earlier")
            .expect("count");
        assert_eq!(be.count, 1);
        assert_eq!(s.progress.rated_count, 3);
    }
}
