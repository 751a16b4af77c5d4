//! Reference data. Public: no identity is required.

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::Request;
use crate::taxonomy::{self, AssessmentType};
use serde_json::json;

fn parse_type(req: &Request) -> Result<AssessmentType, serde_json::Value> {
    let raw = required_str(req, "type")?;
    AssessmentType::parse(&raw).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("unknown assessment type: {}", raw),
            Some(json!({ "allowed": AssessmentType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>() })),
        )
    })
}

fn handle_types(req: &Request) -> serde_json::Value {
    let types: Vec<_> = AssessmentType::ALL
        .iter()
        .map(|t| {
            json!({
                "id": t.as_str(),
                "label": t.label(),
                "domainCount": t.domains().len(),
                "measureCount": taxonomy::total_measures(*t),
                "levelCount": t.levels().len(),
            })
        })
        .collect();
    ok(&req.id, json!({ "types": types }))
}

fn handle_domains(req: &Request) -> serde_json::Value {
    let kind = match parse_type(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let domains: Vec<_> = kind.domains().iter().map(taxonomy::domain_json).collect();
    ok(
        &req.id,
        json!({ "assessmentType": kind.as_str(), "domains": domains }),
    )
}

fn handle_levels(req: &Request) -> serde_json::Value {
    let kind = match parse_type(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let levels: Vec<_> = kind.levels().iter().map(taxonomy::level_json).collect();
    ok(
        &req.id,
        json!({ "assessmentType": kind.as_str(), "levels": levels }),
    )
}

pub fn try_handle(req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "taxonomy.types" => Some(handle_types(req)),
        "taxonomy.domains" => Some(handle_domains(req)),
        "taxonomy.levels" => Some(handle_levels(req)),
        _ => None,
    }
}
