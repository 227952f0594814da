//! Per-section schema bindings

use crate::shape::{ArrayShape, Field, FieldType, ObjectShape, Schema};
use grantgen_document::SectionKind;

/// Risk categories
pub const RISK_CATEGORIES: &[&str] = &["technical", "social", "economic", "environmental"];

/// Likelihood and impact levels
pub const RISK_LEVELS: &[&str] = &["low", "medium", "high"];

/// Task dependency types
pub const DEPENDENCY_TYPES: &[&str] = &["FS", "SS", "FF", "SF"];

fn text(name: &'static str, description: &'static str) -> Field {
    Field::required(name, FieldType::String, description)
}

fn list(items: ObjectShape, min_items: usize) -> FieldType {
    FieldType::Array(Box::new(ArrayShape::new(FieldType::Object(items), min_items)))
}

fn problem() -> ObjectShape {
    ObjectShape::new(vec![
        text("title", "one-sentence statement"),
        text("description", "evidence-based explanation"),
    ])
}

fn objective() -> ObjectShape {
    ObjectShape::new(vec![
        Field::optional("id", FieldType::String, "keep existing identifiers"),
        text("title", "starts with an infinitive verb"),
        text("description", ""),
        text("indicator", "measurable target with unit and deadline"),
    ])
}

fn result_item() -> ObjectShape {
    ObjectShape::new(vec![
        text("title", ""),
        text("description", ""),
        text("indicator", "measurable target"),
    ])
}

fn work_package() -> ObjectShape {
    let dependency = ObjectShape::new(vec![
        text("predecessorId", "task identifier such as T1.1"),
        Field::required("type", FieldType::Enum(DEPENDENCY_TYPES), ""),
    ]);
    let task = ObjectShape::new(vec![
        text("id", "T{wp}.{n}"),
        text("title", ""),
        text("description", ""),
        Field::required("startDate", FieldType::Date, "within the project timeframe"),
        Field::required("endDate", FieldType::Date, "within the project timeframe"),
        Field::optional("dependencies", list(dependency, 0), ""),
    ]);
    let milestone = ObjectShape::new(vec![
        text("id", "M{wp}.{n}"),
        text("description", ""),
        Field::required("date", FieldType::Date, "within the project timeframe"),
    ]);
    let deliverable = ObjectShape::new(vec![
        text("id", "D{wp}.{n}"),
        text("title", ""),
        text("description", ""),
        text("indicator", "verifiable acceptance criterion"),
    ]);
    ObjectShape::new(vec![
        text("id", "WP{n}"),
        text("title", ""),
        Field::required("tasks", list(task, 2), ""),
        Field::required("milestones", list(milestone, 1), ""),
        Field::required("deliverables", list(deliverable, 1), ""),
    ])
}

/// Schema bound to a section
///
/// Exhaustive over [`SectionKind`], so every section has exactly one shape.
#[must_use]
pub fn schema_for(section: SectionKind) -> Schema {
    match section {
        SectionKind::ProblemAnalysis => Schema::Object(ObjectShape::new(vec![
            Field::required("coreProblem", FieldType::Object(problem()), ""),
            Field::required("causes", list(problem(), 3), ""),
            Field::required("consequences", list(problem(), 3), ""),
        ])),
        SectionKind::ProjectIdea => Schema::Object(ObjectShape::new(vec![
            text("projectTitle", "concise, no acronym, no label"),
            text("projectAcronym", "3-10 uppercase letters"),
            text("mainAim", "one sentence"),
            text("stateOfTheArt", ""),
            text("proposedSolution", ""),
            Field::required(
                "policies",
                list(
                    ObjectShape::new(vec![text("name", "EU policy"), text("description", "")]),
                    2,
                ),
                "",
            ),
        ])),
        SectionKind::GeneralObjectives | SectionKind::SpecificObjectives => {
            Schema::Array(ArrayShape::new(FieldType::Object(objective()), 3))
        }
        SectionKind::Activities => {
            Schema::Array(ArrayShape::new(FieldType::Object(work_package()), 3))
        }
        SectionKind::Risks => Schema::Array(ArrayShape::new(
            FieldType::Object(ObjectShape::new(vec![
                Field::optional("id", FieldType::String, "keep existing identifiers"),
                Field::required("category", FieldType::Enum(RISK_CATEGORIES), ""),
                text("title", ""),
                text("description", ""),
                Field::required("likelihood", FieldType::Enum(RISK_LEVELS), ""),
                Field::required("impact", FieldType::Enum(RISK_LEVELS), ""),
                text("mitigation", "concrete preventive and corrective measures"),
            ])),
            5,
        )),
        SectionKind::Outputs | SectionKind::Outcomes | SectionKind::Impacts => {
            Schema::Array(ArrayShape::new(FieldType::Object(result_item()), 3))
        }
        SectionKind::Kers => Schema::Array(ArrayShape::new(
            FieldType::Object(ObjectShape::new(vec![
                Field::optional("id", FieldType::String, "keep existing identifiers"),
                text("title", ""),
                text("description", ""),
                text("exploitationStrategy", "who exploits it, how, and when"),
            ])),
            3,
        )),
    }
}
