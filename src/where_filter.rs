//! Where-filter templates and the call extractor that reads them.
//!
//! A template is opaque SQL with `{{ ... }}` markers. Each marker holds one
//! call to `Dimension`, `TimeDimension`, `Entity` or `Metric`, optionally
//! followed by method calls:
//!
//! ```text
//! {{ Dimension('user__country', entity_path=['listing']) }} = 'US'
//! {{ TimeDimension('metric_time', 'month') }} >= '2024-01-01'
//! {{ Dimension('booking__created_at').grain('week') }} IS NOT NULL
//! {{ Metric('bookings', group_by=['listing']) }} > 10
//! ```
//!
//! Nothing outside the markers is inspected. Every call produces exactly one
//! entry in the returned [`FilterCallParameterSets`], in call order.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::call_parameter_sets::*;
use crate::enums::DatePart;
use crate::error::{WhereFilterParseError, WhereFilterParseErrorKind};
use crate::naming::{
    DUNDER, METRIC_TIME_ELEMENT_NAME, StructuredDunderedName, is_metric_time_name,
    parse_dundered_name,
};
use crate::references::*;

static GRANULARITY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap());

// ─── Filter types ───────────────────────────────────────────────────────────

/// A single where-filter template.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct WhereFilter {
    pub where_sql_template: String,
}

impl WhereFilter {
    pub fn new(where_sql_template: impl Into<String>) -> Self {
        Self {
            where_sql_template: where_sql_template.into(),
        }
    }

    /// Parse the template. Not cached; the template never changes.
    pub fn call_parameter_sets(
        &self,
        custom_granularity_names: &[String],
    ) -> Result<FilterCallParameterSets, WhereFilterParseError> {
        parse_where_filter(&self.where_sql_template, custom_granularity_names)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WhereFilterRepr {
    Template(String),
    Object { where_sql_template: String },
}

impl<'de> Deserialize<'de> for WhereFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WhereFilterRepr::deserialize(deserializer)? {
            WhereFilterRepr::Template(t) | WhereFilterRepr::Object { where_sql_template: t } => {
                WhereFilter::new(t)
            }
        })
    }
}

/// Filters that must all hold. Written in YAML as one template string or a
/// list of them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct WhereFilterIntersection {
    pub where_filters: Vec<WhereFilter>,
}

impl WhereFilterIntersection {
    pub fn new(where_filters: Vec<WhereFilter>) -> Self {
        Self { where_filters }
    }

    /// Shorthand for a one-template intersection.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self::new(vec![WhereFilter::new(template)])
    }

    /// Parse every template, pairing each with its call sets. Stops at the
    /// first template that fails.
    pub fn filter_expression_parameter_sets(
        &self,
        custom_granularity_names: &[String],
    ) -> Result<Vec<(String, FilterCallParameterSets)>, WhereFilterParseError> {
        self.where_filters
            .iter()
            .map(|f| {
                f.call_parameter_sets(custom_granularity_names)
                    .map(|sets| (f.where_sql_template.clone(), sets))
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WhereFilterIntersectionRepr {
    Single(WhereFilter),
    List(Vec<WhereFilter>),
    Object { where_filters: Vec<WhereFilter> },
}

impl<'de> Deserialize<'de> for WhereFilterIntersection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WhereFilterIntersectionRepr::deserialize(deserializer)? {
            WhereFilterIntersectionRepr::Single(f) => WhereFilterIntersection::new(vec![f]),
            WhereFilterIntersectionRepr::List(filters)
            | WhereFilterIntersectionRepr::Object {
                where_filters: filters,
            } => WhereFilterIntersection::new(filters),
        })
    }
}

// ─── Entry points ───────────────────────────────────────────────────────────

/// Extract every call from a where-filter template.
///
/// `custom_granularity_names` are recognized as grain suffixes of dundered
/// names in addition to the standard granularities.
pub fn parse_where_filter(
    template: &str,
    custom_granularity_names: &[String],
) -> Result<FilterCallParameterSets, WhereFilterParseError> {
    let mut sets = FilterCallParameterSets::default();
    for block in extract_blocks(template)? {
        let expr = ExprParser::new(template, block)?.parse()?;
        record_call(&expr, custom_granularity_names, &mut sets).map_err(|e| e.into_parse_error(template))?;
    }
    Ok(sets)
}

/// Parse a saved-query group-by item such as `Dimension('listing__country')`.
/// The item may or may not carry its own `{{ }}` markers.
pub fn parse_group_by_item(
    item: &str,
    custom_granularity_names: &[String],
) -> Result<FilterCallParameterSets, WhereFilterParseError> {
    if item.contains("{{") {
        parse_where_filter(item, custom_granularity_names)
    } else {
        parse_where_filter(&format!("{{{{ {} }}}}", item), custom_granularity_names)
    }
}

// ─── Marker scanning ────────────────────────────────────────────────────────

fn syntax_error(template: &str, cause: impl Into<String>) -> WhereFilterParseError {
    WhereFilterParseError {
        kind: WhereFilterParseErrorKind::Syntax,
        template: template.to_string(),
        cause: cause.into(),
    }
}

/// Return the inner text of every `{{ ... }}` marker. Quotes inside a marker
/// may contain `}}`.
fn extract_blocks(template: &str) -> Result<Vec<&str>, WhereFilterParseError> {
    let bytes = template.as_bytes();
    let mut blocks = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if !(bytes[i] == b'{' && bytes[i + 1] == b'{') {
            i += 1;
            continue;
        }
        let open = i;
        let start = i + 2;
        let mut j = start;
        let mut quote: Option<u8> = None;
        let mut end = None;
        while j < bytes.len() {
            let b = bytes[j];
            match quote {
                Some(q) => {
                    if b == b'\\' {
                        j += 1;
                    } else if b == q {
                        quote = None;
                    }
                }
                None => {
                    if b == b'\'' || b == b'"' {
                        quote = Some(b);
                    } else if b == b'}' && j + 1 < bytes.len() && bytes[j + 1] == b'}' {
                        end = Some(j);
                        break;
                    }
                }
            }
            j += 1;
        }
        match end {
            Some(end) => {
                blocks.push(&template[start..end]);
                i = end + 2;
            }
            None => {
                return Err(syntax_error(
                    template,
                    format!("unclosed `{{{{` starting at position {}", open),
                ));
            }
        }
    }
    Ok(blocks)
}

// ─── Tokens ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
    Dot,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier `{}`", s),
            Token::Str(s) => format!("string '{}'", s),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::Dot => "`.`".to_string(),
        }
    }
}

fn tokenize(template: &str, block: &str) -> Result<Vec<Token>, WhereFilterParseError> {
    let mut tokens = Vec::new();
    let mut chars = block.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            ',' => tokens.push(Token::Comma),
            '=' => tokens.push(Token::Equals),
            '.' => tokens.push(Token::Dot),
            '\'' | '"' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, next)) = chars.next() {
                    match next {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        n if n == c => {
                            closed = true;
                            break;
                        }
                        n => value.push(n),
                    }
                }
                if !closed {
                    return Err(syntax_error(
                        template,
                        format!("unterminated string literal at position {}", pos),
                    ));
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(syntax_error(
                    template,
                    format!("unexpected character '{}' at position {}", other, pos),
                ));
            }
        }
    }
    Ok(tokens)
}

// ─── Expressions ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Str(String),
    List(Vec<Value>),
    Bool(bool),
    None,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Bool(_) => "boolean",
            Value::None => "None",
        }
    }
}

#[derive(Clone, Debug)]
struct Call {
    name: String,
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

/// `Name(args)` followed by zero or more `.method(args)`.
#[derive(Clone, Debug)]
struct CallExpr {
    base: Call,
    methods: Vec<Call>,
}

const BOUND_NAMES: [&str; 4] = ["Dimension", "TimeDimension", "Entity", "Metric"];

struct ExprParser<'a> {
    template: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(template: &'a str, block: &str) -> Result<Self, WhereFilterParseError> {
        Ok(Self {
            template,
            tokens: tokenize(template, block)?,
            pos: 0,
        })
    }

    fn error(&self, kind: WhereFilterParseErrorKind, cause: impl Into<String>) -> WhereFilterParseError {
        WhereFilterParseError {
            kind,
            template: self.template.to_string(),
            cause: cause.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), WhereFilterParseError> {
        match self.next() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(self.error(
                WhereFilterParseErrorKind::Syntax,
                format!("expected {}, found {}", expected.describe(), t.describe()),
            )),
            None => Err(self.error(
                WhereFilterParseErrorKind::Syntax,
                format!("expected {}, found end of expression", expected.describe()),
            )),
        }
    }

    fn parse(mut self) -> Result<CallExpr, WhereFilterParseError> {
        let name = match self.next() {
            Some(Token::Ident(name)) => name,
            Some(t) => {
                return Err(self.error(
                    WhereFilterParseErrorKind::Syntax,
                    format!("expected a call, found {}", t.describe()),
                ));
            }
            None => {
                return Err(self.error(WhereFilterParseErrorKind::Syntax, "empty expression"));
            }
        };
        if !BOUND_NAMES.contains(&name.as_str()) {
            return Err(self.error(
                WhereFilterParseErrorKind::UnboundIdentifier,
                format!(
                    "'{}' is undefined; only {} can be used in a template",
                    name,
                    BOUND_NAMES.join(", ")
                ),
            ));
        }
        if self.peek() != Some(&Token::LParen) {
            return Err(self.error(
                WhereFilterParseErrorKind::Syntax,
                format!("`{}` must be called, e.g. `{}('name')`", name, name),
            ));
        }
        let base = self.parse_call_args(name)?;

        let mut methods = Vec::new();
        while self.peek() == Some(&Token::Dot) {
            self.next();
            let method = match self.next() {
                Some(Token::Ident(m)) => m,
                _ => {
                    return Err(self.error(
                        WhereFilterParseErrorKind::Syntax,
                        "expected a method name after `.`",
                    ));
                }
            };
            methods.push(self.parse_call_args(method)?);
        }

        if let Some(t) = self.peek() {
            return Err(self.error(
                WhereFilterParseErrorKind::Syntax,
                format!("unexpected {} after call expression", t.describe()),
            ));
        }
        Ok(CallExpr { base, methods })
    }

    fn parse_call_args(&mut self, name: String) -> Result<Call, WhereFilterParseError> {
        self.expect(Token::LParen)?;
        let mut positional = Vec::new();
        let mut keyword: Vec<(String, Value)> = Vec::new();
        loop {
            if self.peek() == Some(&Token::RParen) {
                self.next();
                break;
            }
            if let (Some(Token::Ident(key)), Some(Token::Equals)) =
                (self.peek().cloned(), self.tokens.get(self.pos + 1))
            {
                self.pos += 2;
                let value = self.parse_value()?;
                keyword.push((key, value));
            } else {
                if !keyword.is_empty() {
                    return Err(self.error(
                        WhereFilterParseErrorKind::Syntax,
                        format!("positional argument follows keyword argument in `{}`", name),
                    ));
                }
                positional.push(self.parse_value()?);
            }
            match self.next() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => break,
                Some(t) => {
                    return Err(self.error(
                        WhereFilterParseErrorKind::Syntax,
                        format!("expected `,` or `)`, found {}", t.describe()),
                    ));
                }
                None => {
                    return Err(self.error(
                        WhereFilterParseErrorKind::Syntax,
                        format!("unclosed argument list for `{}`", name),
                    ));
                }
            }
        }
        Ok(Call {
            name,
            positional,
            keyword,
        })
    }

    fn parse_value(&mut self) -> Result<Value, WhereFilterParseError> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                loop {
                    if self.peek() == Some(&Token::RBracket) {
                        self.next();
                        break;
                    }
                    items.push(self.parse_value()?);
                    match self.next() {
                        Some(Token::Comma) => {}
                        Some(Token::RBracket) => break,
                        _ => {
                            return Err(
                                self.error(WhereFilterParseErrorKind::Syntax, "unclosed list literal")
                            );
                        }
                    }
                }
                Ok(Value::List(items))
            }
            Some(Token::Ident(id)) => match id.as_str() {
                "True" | "true" => Ok(Value::Bool(true)),
                "False" | "false" => Ok(Value::Bool(false)),
                "None" | "none" => Ok(Value::None),
                other => Err(self.error(
                    WhereFilterParseErrorKind::UnboundIdentifier,
                    format!("'{}' is undefined; arguments must be literals", other),
                )),
            },
            Some(t) => Err(self.error(
                WhereFilterParseErrorKind::Syntax,
                format!("expected a literal argument, found {}", t.describe()),
            )),
            None => Err(self.error(
                WhereFilterParseErrorKind::Syntax,
                "expected a literal argument, found end of expression",
            )),
        }
    }
}

// ─── Argument binding ───────────────────────────────────────────────────────

/// Failure in call semantics; the template is attached by the caller.
struct CallError {
    kind: WhereFilterParseErrorKind,
    cause: String,
}

impl CallError {
    fn new(kind: WhereFilterParseErrorKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    fn into_parse_error(self, template: &str) -> WhereFilterParseError {
        WhereFilterParseError {
            kind: self.kind,
            template: template.to_string(),
            cause: self.cause,
        }
    }
}

fn invalid_argument(cause: impl Into<String>) -> CallError {
    CallError::new(WhereFilterParseErrorKind::InvalidArgument, cause)
}

struct BoundArgs {
    call: String,
    values: HashMap<&'static str, Value>,
}

impl BoundArgs {
    /// Bind positional then keyword arguments to `params`; the first
    /// `required` params must be supplied.
    fn bind(call: &Call, params: &[&'static str], required: usize) -> Result<Self, CallError> {
        if call.positional.len() > params.len() {
            return Err(invalid_argument(format!(
                "`{}` takes at most {} argument(s) but {} were given",
                call.name,
                params.len(),
                call.positional.len()
            )));
        }
        let mut values = HashMap::new();
        for (param, value) in params.iter().zip(call.positional.iter()) {
            values.insert(*param, value.clone());
        }
        for (key, value) in &call.keyword {
            let Some(param) = params.iter().find(|p| **p == key.as_str()) else {
                return Err(invalid_argument(format!(
                    "`{}` got an unexpected keyword argument '{}'",
                    call.name, key
                )));
            };
            if values.insert(*param, value.clone()).is_some() {
                return Err(invalid_argument(format!(
                    "`{}` got multiple values for argument '{}'",
                    call.name, key
                )));
            }
        }
        for param in &params[..required] {
            if !values.contains_key(param) {
                return Err(invalid_argument(format!(
                    "`{}` is missing required argument '{}'",
                    call.name, param
                )));
            }
        }
        Ok(Self {
            call: call.name.clone(),
            values,
        })
    }

    fn string(&self, param: &str) -> Result<Option<String>, CallError> {
        match self.values.get(param) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(invalid_argument(format!(
                "argument '{}' of `{}` must be a string, got {}",
                param,
                self.call,
                other.type_name()
            ))),
        }
    }

    fn required_string(&self, param: &str) -> Result<String, CallError> {
        self.string(param)?.ok_or_else(|| {
            invalid_argument(format!("argument '{}' of `{}` must not be None", param, self.call))
        })
    }

    fn string_list(&self, param: &str) -> Result<Vec<String>, CallError> {
        match self.values.get(param) {
            None | Some(Value::None) => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Str(s) => Ok(s.clone()),
                    other => Err(invalid_argument(format!(
                        "argument '{}' of `{}` must be a list of strings, found {}",
                        param,
                        self.call,
                        other.type_name()
                    ))),
                })
                .collect(),
            Some(other) => Err(invalid_argument(format!(
                "argument '{}' of `{}` must be a list, got {}",
                param,
                self.call,
                other.type_name()
            ))),
        }
    }

    fn boolean(&self, param: &str) -> Result<Option<bool>, CallError> {
        match self.values.get(param) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(invalid_argument(format!(
                "argument '{}' of `{}` must be a boolean, got {}",
                param,
                self.call,
                other.type_name()
            ))),
        }
    }
}

// ─── Call semantics ─────────────────────────────────────────────────────────

fn incorrect_format(name: &str) -> CallError {
    CallError::new(
        WhereFilterParseErrorKind::IncorrectFormat,
        format!(
            "Name is in an incorrect format: '{}'. It should be of the form: <primary entity name>__<dimension_name>",
            name
        ),
    )
}

fn entity_path_references(entity_path: &[String]) -> Vec<EntityReference> {
    entity_path.iter().map(EntityReference::new).collect()
}

fn record_call(
    expr: &CallExpr,
    custom_granularity_names: &[String],
    sets: &mut FilterCallParameterSets,
) -> Result<(), CallError> {
    let base = &expr.base;
    match base.name.as_str() {
        "Dimension" => {
            let args = BoundArgs::bind(base, &["name", "entity_path"], 1)?;
            let name = args.required_string("name")?;
            let entity_path = args.string_list("entity_path")?;

            let mut grain = None;
            let mut date_part = None;
            for method in &expr.methods {
                match method.name.as_str() {
                    "grain" => {
                        let m = BoundArgs::bind(method, &["time_granularity_name"], 1)?;
                        grain = Some(m.required_string("time_granularity_name")?);
                    }
                    "date_part" => {
                        let m = BoundArgs::bind(method, &["date_part_name"], 1)?;
                        date_part = Some(m.required_string("date_part_name")?);
                    }
                    "descending" => {
                        BoundArgs::bind(method, &["descending"], 1)?.boolean("descending")?;
                    }
                    other => return Err(unknown_method("Dimension", other)),
                }
            }

            if grain.is_some() || date_part.is_some() {
                sets.time_dimension_call_parameter_sets
                    .push(create_time_dimension(
                        &name,
                        grain.as_deref(),
                        &entity_path,
                        date_part.as_deref(),
                        custom_granularity_names,
                    )?);
            } else {
                sets.dimension_call_parameter_sets.push(create_dimension(
                    &name,
                    &entity_path,
                    custom_granularity_names,
                )?);
            }
        }
        "TimeDimension" => {
            let args = BoundArgs::bind(
                base,
                &[
                    "time_dimension_name",
                    "time_granularity_name",
                    "entity_path",
                    "descending",
                    "date_part_name",
                ],
                1,
            )?;
            let name = args.required_string("time_dimension_name")?;
            let grain = args.string("time_granularity_name")?;
            let entity_path = args.string_list("entity_path")?;
            args.boolean("descending")?;
            let date_part = args.string("date_part_name")?;
            check_descending_only("TimeDimension", &expr.methods)?;
            sets.time_dimension_call_parameter_sets
                .push(create_time_dimension(
                    &name,
                    grain.as_deref(),
                    &entity_path,
                    date_part.as_deref(),
                    custom_granularity_names,
                )?);
        }
        "Entity" => {
            let args = BoundArgs::bind(base, &["entity_name", "entity_path"], 1)?;
            let name = args.required_string("entity_name")?;
            let entity_path = args.string_list("entity_path")?;
            check_descending_only("Entity", &expr.methods)?;
            sets.entity_call_parameter_sets
                .push(create_entity(&name, &entity_path, custom_granularity_names)?);
        }
        "Metric" => {
            let args = BoundArgs::bind(base, &["metric_name", "group_by"], 1)?;
            let name = args.required_string("metric_name")?;
            let group_by = args.string_list("group_by")?;
            check_descending_only("Metric", &expr.methods)?;
            sets.metric_call_parameter_sets
                .push(create_metric(&name, &group_by)?);
        }
        other => {
            return Err(CallError::new(
                WhereFilterParseErrorKind::UnboundIdentifier,
                format!("'{}' is undefined", other),
            ));
        }
    }
    Ok(())
}

fn unknown_method(call: &str, method: &str) -> CallError {
    CallError::new(
        WhereFilterParseErrorKind::UnboundIdentifier,
        format!("`{}(...)` has no method `{}`", call, method),
    )
}

fn check_descending_only(call: &str, methods: &[Call]) -> Result<(), CallError> {
    for method in methods {
        if method.name != "descending" {
            return Err(unknown_method(call, &method.name));
        }
        BoundArgs::bind(method, &["descending"], 1)?.boolean("descending")?;
    }
    Ok(())
}

/// Dundered name with every segment present.
fn parse_element_name(
    name: &str,
    custom_granularity_names: &[String],
) -> Result<StructuredDunderedName, CallError> {
    if name.split(DUNDER).any(str::is_empty) {
        return Err(CallError::new(
            WhereFilterParseErrorKind::IncorrectFormat,
            format!(
                "Name is in an incorrect format: '{}'. The element name and any entity links before it must be non-empty.",
                name
            ),
        ));
    }
    Ok(parse_dundered_name(name, custom_granularity_names))
}

fn create_dimension(
    name: &str,
    entity_path: &[String],
    custom_granularity_names: &[String],
) -> Result<DimensionCallParameterSet, CallError> {
    let parsed = parse_element_name(name, custom_granularity_names)?;
    if is_metric_time_name(&parsed.element_name) {
        return Err(CallError::new(
            WhereFilterParseErrorKind::ReservedName,
            format!(
                "{} is a time dimension, so it should be referenced using TimeDimension(...) or Dimension(...).grain(...)",
                METRIC_TIME_ELEMENT_NAME
            ),
        ));
    }
    if parsed.entity_links.len() != 1 {
        return Err(incorrect_format(name));
    }
    if parsed.time_granularity.is_some() {
        return Err(CallError::new(
            WhereFilterParseErrorKind::IncorrectFormat,
            format!(
                "Name is in an incorrect format: '{}'. A granularity suffix is only allowed when referencing a time dimension with TimeDimension(...)",
                name
            ),
        ));
    }
    let mut path = entity_path_references(entity_path);
    path.extend(parsed.entity_links);
    Ok(DimensionCallParameterSet {
        entity_path: path,
        dimension_reference: DimensionReference::new(parsed.element_name),
    })
}

fn create_time_dimension(
    name: &str,
    time_granularity_name: Option<&str>,
    entity_path: &[String],
    date_part_name: Option<&str>,
    custom_granularity_names: &[String],
) -> Result<TimeDimensionCallParameterSet, CallError> {
    let parsed = parse_element_name(name, custom_granularity_names)?;
    if is_metric_time_name(&parsed.element_name) {
        if !parsed.entity_links.is_empty() || parsed.time_granularity.is_some() {
            return Err(CallError::new(
                WhereFilterParseErrorKind::ReservedName,
                format!(
                    "Name is in an incorrect format: '{}'. When referencing {}, the name should not have any dunders (double underscores, or __).",
                    name, METRIC_TIME_ELEMENT_NAME
                ),
            ));
        }
    } else if parsed.entity_links.len() != 1 {
        return Err(incorrect_format(name));
    }

    if let Some(grain) = time_granularity_name
        && !GRANULARITY_NAME_RE.is_match(grain)
    {
        return Err(CallError::new(
            WhereFilterParseErrorKind::InvalidGranularity,
            format!("Invalid time granularity name '{}'", grain),
        ));
    }

    let grain_from_name = parsed.time_granularity.as_deref();
    if let (Some(from_name), Some(explicit)) = (grain_from_name, time_granularity_name)
        && !from_name.eq_ignore_ascii_case(explicit)
    {
        return Err(CallError::new(
            WhereFilterParseErrorKind::InvalidGranularity,
            format!(
                "Received different grains in `time_dimension_name` parameter ('{}') and `time_granularity_name` parameter ('{}'). Remove the grain suffix (`{}`) from the time dimension name and use the `time_granularity_name` parameter to specify the desired grain.",
                name, explicit, from_name
            ),
        ));
    }

    let date_part = match date_part_name {
        None => None,
        Some(part) => Some(DatePart::from_name(&part.to_lowercase()).ok_or_else(|| {
            CallError::new(
                WhereFilterParseErrorKind::InvalidDatePart,
                format!(
                    "Invalid date part '{}'. Valid date parts: {}",
                    part,
                    DatePart::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })?),
    };

    let mut path = entity_path_references(entity_path);
    path.extend(parsed.entity_links);
    Ok(TimeDimensionCallParameterSet {
        entity_path: path,
        time_dimension_reference: TimeDimensionReference::new(parsed.element_name),
        time_granularity_name: grain_from_name
            .or(time_granularity_name)
            .map(|g| g.to_lowercase()),
        date_part,
    })
}

fn create_entity(
    name: &str,
    entity_path: &[String],
    custom_granularity_names: &[String],
) -> Result<EntityCallParameterSet, CallError> {
    let parsed = parse_element_name(name, custom_granularity_names)?;
    if !parsed.entity_links.is_empty() || parsed.time_granularity.is_some() {
        return Err(CallError::new(
            WhereFilterParseErrorKind::IncorrectFormat,
            format!(
                "Name is in an incorrect format: '{}'. There should be no dunders (double underscores, or __) in the name.",
                name
            ),
        ));
    }
    Ok(EntityCallParameterSet {
        entity_path: entity_path_references(entity_path),
        entity_reference: EntityReference::new(parsed.element_name),
    })
}

fn create_metric(name: &str, group_by: &[String]) -> Result<MetricCallParameterSet, CallError> {
    if name.is_empty() {
        return Err(CallError::new(
            WhereFilterParseErrorKind::IncorrectFormat,
            "Name is in an incorrect format: ''. A metric name must be non-empty.",
        ));
    }
    if group_by.is_empty() {
        return Err(invalid_argument(
            "`group_by` parameter is required for Metric in where filter. This is needed to determine 1) the granularity to aggregate the metric to and 2) how to join the metric to the rest of the query. Example: `Metric('metric_name', group_by=['entity'])`. For metric filters, `group_by` must be an entity.",
        ));
    }
    Ok(MetricCallParameterSet {
        metric_reference: MetricReference::new(name),
        group_by: group_by.iter().map(LinkableElementReference::new).collect(),
    })
}
