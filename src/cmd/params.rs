/*!
Parameter declarations and the metadata registry.

A [`ParameterSpec`] is the ordered list of options/arguments a collection
method accepts. Specs are attached to a method (identified by a
[`MethodKey`]) in the process-wide [`MetadataRegistry`] and read back when
a sub-command is synthesized. The registry hands out shared references only;
anything that wants to extend a declaration list must clone it first.

[`Invocation`] is the other direction: the parsed values for one call,
bound from clap matches according to a `ParameterSpec`.
*/

use std::collections::{BTreeMap, HashMap};

use clap::builder::{BoolishValueParser, PossibleValuesParser};
use clap::{Arg, ArgAction, ArgMatches};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `--name VALUE`
    Option,
    /// Positional.
    Argument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Integer,
    /// Takes an explicit true/false style value.
    Boolean,
    Choice(Vec<String>),
    /// Repeatable option collecting every occurrence.
    List,
}

/// One option or argument declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub kind: ParamKind,
    pub value_type: ValueType,
    pub default: Option<String>,
    pub required: bool,
    pub help: Option<String>,
    pub metavar: Option<String>,
}

impl ParamDecl {
    fn new(name: &str, kind: ParamKind) -> Self {
        ParamDecl {
            name: name.to_string(),
            kind,
            value_type: ValueType::Text,
            default: None,
            required: false,
            help: None,
            metavar: None,
        }
    }

    pub fn option(name: &str) -> Self {
        Self::new(name, ParamKind::Option)
    }

    pub fn argument(name: &str) -> Self {
        Self::new(name, ParamKind::Argument)
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = Some(text.to_string());
        self
    }

    pub fn metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn integer(mut self) -> Self {
        self.value_type = ValueType::Integer;
        self
    }

    pub fn boolean(mut self) -> Self {
        self.value_type = ValueType::Boolean;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.value_type = ValueType::List;
        self
    }

    pub fn choice(mut self, values: &[&str]) -> Self {
        self.value_type = ValueType::Choice(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// clap argument for this declaration.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).required(self.required);
        if self.kind == ParamKind::Option {
            arg = arg.long(self.name.clone());
        }
        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        if let Some(metavar) = &self.metavar {
            arg = arg.value_name(metavar.clone());
        }

        arg = match &self.value_type {
            ValueType::Text => arg.action(ArgAction::Set),
            ValueType::Integer => arg
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(i64)),
            ValueType::Boolean => arg
                .action(ArgAction::Set)
                .value_parser(BoolishValueParser::new()),
            ValueType::Choice(values) => arg
                .action(ArgAction::Set)
                .value_parser(PossibleValuesParser::new(values.clone())),
            ValueType::List => arg.action(ArgAction::Append),
        };

        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        arg
    }
}

/// Ordered parameter declarations of one method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSpec(Vec<ParamDecl>);

impl ParameterSpec {
    pub const fn new() -> Self {
        ParameterSpec(Vec::new())
    }

    #[cfg(test)]
    pub fn push(&mut self, decl: ParamDecl) {
        self.0.push(decl);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDecl> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|d| d.name.as_str()).collect()
    }
}

impl From<Vec<ParamDecl>> for ParameterSpec {
    fn from(v: Vec<ParamDecl>) -> Self {
        ParameterSpec(v)
    }
}

/// Identity of a method, independent of any collection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub collection: &'static str,
    pub method: &'static str,
}

impl MethodKey {
    pub const fn new(collection: &'static str, method: &'static str) -> Self {
        MethodKey { collection, method }
    }
}

static EMPTY_SPEC: ParameterSpec = ParameterSpec::new();

/// Parameter specs attached to methods, keyed by [`MethodKey`].
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    specs: HashMap<MethodKey, ParameterSpec>,
}

impl MetadataRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach declarations to `target`. Attaching again appends in order.
    pub fn attach(&mut self, target: MethodKey, spec: impl Into<ParameterSpec>) {
        let spec = spec.into();
        crate::log_trace!(
            "attach {}.{}: {:?}",
            target.collection,
            target.method,
            spec.names()
        );
        self.specs.entry(target).or_default().0.extend(spec.0);
    }

    /// Declarations of `target`, empty when nothing was attached.
    pub fn read(&self, target: &MethodKey) -> &ParameterSpec {
        self.specs.get(target).unwrap_or(&EMPTY_SPEC)
    }
}

/// A bound argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    List(Vec<String>),
}

/// Parsed values for one sub-command call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    values: BTreeMap<String, ArgValue>,
}

impl Invocation {
    /// Read every declared parameter out of `matches`.
    pub fn bind(spec: &ParameterSpec, matches: &ArgMatches) -> Result<Self> {
        let mut inv = Invocation::default();
        for decl in spec.iter() {
            let id = decl.name.as_str();
            let value = match decl.value_type {
                ValueType::Text | ValueType::Choice(_) => matches
                    .try_get_one::<String>(id)
                    .map(|v| v.cloned().map(ArgValue::Text)),
                ValueType::Integer => matches
                    .try_get_one::<i64>(id)
                    .map(|v| v.copied().map(ArgValue::Integer)),
                ValueType::Boolean => matches
                    .try_get_one::<bool>(id)
                    .map(|v| v.copied().map(ArgValue::Bool)),
                ValueType::List => matches
                    .try_get_many::<String>(id)
                    .map(|v| v.map(|vals| ArgValue::List(vals.cloned().collect()))),
            }
            .map_err(|e| CliError::validation(format!("argument '{id}': {e}")))?;
            if let Some(v) = value {
                inv.values.insert(decl.name.clone(), v);
            }
        }
        Ok(inv)
    }

    #[cfg(test)]
    pub fn set(mut self, name: &str, value: ArgValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Non-blank text value.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value; absent counts as false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Bool(true)))
    }

    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(ArgValue::List(v)) => v.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    const KEY: MethodKey = MethodKey::new("vms", "query");

    #[test]
    fn read_without_attach_is_empty() {
        let reg = MetadataRegistry::new();
        assert!(reg.read(&KEY).is_empty());
    }

    #[test]
    fn attach_appends_in_order() {
        let mut reg = MetadataRegistry::new();
        reg.attach(KEY, vec![ParamDecl::argument("vm_name")]);
        reg.attach(KEY, vec![ParamDecl::option("provider")]);
        assert_eq!(reg.read(&KEY).names(), ["vm_name", "provider"]);
        assert!(reg.read(&MethodKey::new("vms", "delete")).is_empty());
    }

    fn spec() -> ParameterSpec {
        vec![
            ParamDecl::argument("vm_name").metavar("VM_NAME"),
            ParamDecl::option("by_id").boolean().default_value("false"),
            ParamDecl::option("count").integer(),
            ParamDecl::option("attr").multiple(),
            ParamDecl::option("mode").choice(&["generic"]),
        ]
        .into()
    }

    fn command(spec: &ParameterSpec) -> Command {
        spec.iter()
            .fold(Command::new("query"), |cmd, d| cmd.arg(d.to_arg()))
    }

    #[test]
    fn bind_reads_typed_values() {
        let spec = spec();
        let m = command(&spec)
            .try_get_matches_from([
                "query", "vm1", "--by_id", "true", "--count", "3", "--attr", "a", "--attr", "b",
            ])
            .unwrap();
        let inv = Invocation::bind(&spec, &m).unwrap();
        assert_eq!(inv.text("vm_name"), Some("vm1"));
        assert!(inv.flag("by_id"));
        assert_eq!(inv.integer("count"), Some(3));
        assert_eq!(inv.list("attr"), ["a", "b"]);
        assert_eq!(inv.text("mode"), None);
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let spec = spec();
        let m = command(&spec).try_get_matches_from(["query"]).unwrap();
        let inv = Invocation::bind(&spec, &m).unwrap();
        assert!(!inv.flag("by_id"));
        assert_eq!(inv.text("vm_name"), None);
        assert!(inv.list("attr").is_empty());
    }

    #[test]
    fn choice_rejects_unknown_values() {
        let spec = spec();
        let err = command(&spec)
            .try_get_matches_from(["query", "--mode", "other"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn required_option_is_enforced() {
        let spec: ParameterSpec = vec![ParamDecl::option("method").required()].into();
        let err = command(&spec).try_get_matches_from(["create"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn blank_text_reads_as_absent() {
        let inv = Invocation::default().set("vm_name", ArgValue::Text("  ".into()));
        assert_eq!(inv.text("vm_name"), None);
    }
}
