use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical plan document: entity declarations plus generate statements.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    /// Contract version for the plan format.
    pub plan_version: String,
    /// Seed for reproducibility; absent means a fresh seed per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Dictionary language for `dict` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Suppress `$type`/`$extends` metadata fields on all entities.
    #[serde(default)]
    pub disable_metadata: bool,
    /// Entity declarations, in order.
    #[serde(default)]
    pub entities: Vec<EntityDecl>,
    /// Generation statements, in order.
    #[serde(default)]
    pub generate: Vec<GenerateDecl>,
}

/// One entity declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntityDecl {
    /// Entity name; anonymous when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parent entity name for inheritance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Primary-key policy; `$id`/uid when absent (inherited under
    /// `extends`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkey: Option<PkeyDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// Primary-key policy declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PkeyDecl {
    pub name: String,
    pub kind: PkeyKindDecl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PkeyKindDecl {
    Uid,
    Serial,
}

/// One field declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldDecl {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKindDecl,
    /// Multi-value count: a single integer or an inclusive range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<CountDecl>,
    /// Request the uniqueness feasibility check for this field.
    #[serde(default)]
    pub unique: bool,
}

/// Field producer declarations. Argument-less forms take the engine's
/// default arguments.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKindDecl {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<i64>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Decimal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Bool,
    Uid,
    Serial,
    Dict {
        category: String,
    },
    Enum {
        values: Vec<serde_json::Value>,
    },
    Literal {
        value: serde_json::Value,
    },
    Entity {
        entity: EntityRef,
    },
    Expr {
        expr: ExprDecl,
    },
    Distribution {
        dist: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        weights: Vec<f64>,
        /// Static form: literal bins.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        values: Option<Vec<serde_json::Value>>,
        /// Typed form: one producer per bin.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<DistDomainDecl>,
    },
}

/// Sub-entity reference: either the name of a declared entity or an
/// inline declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EntityRef {
    Name(String),
    Decl(Box<EntityDecl>),
}

/// Typed distribution domain: a field kind tag plus per-bin arguments.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DistDomainDecl {
    #[serde(rename = "type")]
    pub kind: String,
    /// One argument object per bin, in the same shape as the matching
    /// `FieldKindDecl` variant (e.g. `{"min": 1, "max": 10}`).
    pub bins: Vec<serde_json::Value>,
}

/// Deferred expression tree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExprDecl {
    Lit {
        lit: serde_json::Value,
    },
    Ref {
        #[serde(rename = "ref")]
        reference: String,
    },
    Binop {
        op: String,
        lhs: Box<ExprDecl>,
        rhs: Box<ExprDecl>,
    },
}

/// Multi-value count declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CountDecl {
    Exact(i64),
    Range { min: i64, max: i64 },
}

/// One `generate N of E` statement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateDecl {
    /// Target entity: a declared name or an inline declaration.
    pub entity: EntityRef,
    /// Number of instances to produce.
    pub count: i64,
}
