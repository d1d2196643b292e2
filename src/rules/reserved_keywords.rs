use crate::enums::SemanticModelElementType;
use crate::error::{ValidationContext, ValidationIssue};
use crate::rules::SemanticManifestValidationRule;
use crate::types::SemanticManifest;

/// Keywords reserved by the SQL dialects the query engine renders to.
pub const RESERVED_SQL_KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK", "COLUMN",
    "CONNECT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOLLOWING", "FOR", "FROM", "FULL", "GRANT",
    "GROUP", "GROUPING", "HAVING", "IF", "ILIKE", "IN", "INCREMENT", "INNER", "INSERT",
    "INTERSECT", "INTERVAL", "INTO", "IS", "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT",
    "LOCALTIME", "LOCALTIMESTAMP", "MINUS", "NATURAL", "NOT", "NULL", "OF", "OFFSET", "ON", "OR",
    "ORDER", "OUTER", "OVER", "PARTITION", "PRECEDING", "QUALIFY", "RANGE", "REGEXP", "REVOKE",
    "RIGHT", "RLIKE", "ROW", "ROWS", "SAMPLE", "SELECT", "SET", "SOME", "START", "TABLE",
    "TABLESAMPLE", "THEN", "TO", "TRIGGER", "TRUE", "TRY_CAST", "UNBOUNDED", "UNION", "UNIQUE",
    "UPDATE", "USING", "VALUES", "VIEW", "WHEN", "WHENEVER", "WHERE", "WINDOW", "WITH",
];

pub fn is_reserved_sql_keyword(name: &str) -> bool {
    let upper = name.to_uppercase();
    RESERVED_SQL_KEYWORDS.contains(&upper.as_str())
}

/// Element names and node relation aliases end up as SQL identifiers and so
/// can't be reserved keywords.
pub struct ReservedKeywordsRule;

impl SemanticManifestValidationRule for ReservedKeywordsRule {
    fn name(&self) -> &'static str {
        "ReservedKeywordsRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for model in &manifest.semantic_models {
            let elements = model
                .dimensions
                .iter()
                .map(|d| (d.name.as_str(), SemanticModelElementType::Dimension, "a dimension"))
                .chain(
                    model
                        .entities
                        .iter()
                        .map(|e| (e.name.as_str(), SemanticModelElementType::Entity, "an entity")),
                )
                .chain(
                    model
                        .measures
                        .iter()
                        .map(|m| (m.name.as_str(), SemanticModelElementType::Measure, "a measure")),
                );

            for (name, element_type, article) in elements {
                if is_reserved_sql_keyword(name) {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(model, name, element_type),
                        format!(
                            "'{}' is an SQL reserved keyword, and thus cannot be used as {} 'name'.",
                            name, article
                        ),
                    ));
                }
            }

            if is_reserved_sql_keyword(&model.node_relation.alias) {
                issues.push(ValidationIssue::error(
                    ValidationContext::semantic_model(model),
                    format!(
                        "'{}' is an SQL reserved keyword, and thus cannot be used as an alias for a semantic model.",
                        model.node_relation.alias
                    ),
                ));
            }
        }

        issues
    }
}
