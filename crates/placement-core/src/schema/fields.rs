use super::{Constraint, FieldKind, FieldSpec, Pattern};

pub const RESOURCE_CATEGORIES: &[&str] = &["Guidelines", "Company Info", "Prep Materials", "Other"];

pub(super) static RESOURCE: &[FieldSpec] = &[
    FieldSpec {
        name: "category",
        kind: FieldKind::Text,
        required: false,
        default: Some("Other"),
        constraints: &[Constraint::OneOf(RESOURCE_CATEGORIES)],
    },
    FieldSpec {
        name: "description",
        kind: FieldKind::Text,
        required: false,
        default: None,
        constraints: &[Constraint::MaxLen(1000)],
    },
    FieldSpec {
        name: "uploadedBy",
        kind: FieldKind::Text,
        required: false,
        default: Some("Admin"),
        constraints: &[Constraint::MaxLen(100)],
    },
];

pub(super) static SHOWCASE_PROJECT: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[Constraint::MaxLen(200)],
    },
    FieldSpec {
        name: "shortDescription",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[Constraint::MaxLen(250)],
    },
    FieldSpec {
        name: "technologies",
        kind: FieldKind::TextList,
        required: true,
        default: None,
        constraints: &[],
    },
    FieldSpec {
        name: "githubLink",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[Constraint::Matches(Pattern::GithubRepository)],
    },
    FieldSpec {
        name: "liveDemoLink",
        kind: FieldKind::Text,
        required: false,
        default: None,
        constraints: &[Constraint::Matches(Pattern::WebUrl)],
    },
    FieldSpec {
        name: "submittedByName",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[Constraint::MaxLen(120)],
    },
    FieldSpec {
        name: "submittedByEmail",
        kind: FieldKind::Email,
        required: true,
        default: None,
        constraints: &[],
    },
];

pub(super) static ALUMNI_EXPERIENCE: &[FieldSpec] = &[
    FieldSpec {
        name: "alumniName",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[Constraint::MaxLen(120)],
    },
    FieldSpec {
        name: "alumniEmail",
        kind: FieldKind::Email,
        required: false,
        default: None,
        constraints: &[],
    },
    FieldSpec {
        name: "batch",
        kind: FieldKind::Integer,
        required: true,
        default: None,
        constraints: &[Constraint::Min(2000), Constraint::MaxYearsAhead(5)],
    },
    FieldSpec {
        name: "company",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[],
    },
    FieldSpec {
        name: "role",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[],
    },
    FieldSpec {
        name: "experience",
        kind: FieldKind::Text,
        required: true,
        default: None,
        constraints: &[],
    },
];
