//! Documentation model
//!
//! Semantic entities built from the syntax tree: interfaces with their
//! members, and enum typedefs with their constants. Entities know how to merge
//! with another contribution for the same name and how to render themselves
//! as stage-2 XML.

use std::collections::BTreeMap;

use crate::xml::Element;

/// Rendered return type when no `[retval]` parameter supplies one
pub const VOID: &str = "void";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Property => "property",
        }
    }
}

/// A visible parameter of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: String,
    pub name: Option<String>,
    pub optional: bool,
    pub default: Option<String>,
    pub is_retval: bool,
}

impl Parameter {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: Some(name.into()),
            optional: false,
            default: None,
            is_retval: false,
        }
    }

    pub fn to_element(&self) -> Element {
        let mut el = Element::new("parameter");
        if self.optional {
            el.set_attr("optional", "true");
        }
        el.with_child(Element::leaf("default", self.default.as_deref()))
            .with_child(Element::leaf("name", self.name.as_deref()))
            .with_child(Element::leaf("type", Some(&self.ty)))
    }
}

/// A method or property of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub version: String,
    pub kind: MemberKind,
    /// `None` renders as `void`
    pub return_type: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub syntax: Vec<String>,
}

impl Member {
    pub fn returns(&self) -> &str {
        self.return_type.as_deref().unwrap_or(VOID)
    }

    /// Combine two declarations of the same member, e.g. a property's getter
    /// and setter. Merging a member with itself returns it unchanged.
    pub fn merge(self, other: Member) -> Member {
        let kind = if self.kind == MemberKind::Property || other.kind == MemberKind::Property {
            MemberKind::Property
        } else {
            MemberKind::Method
        };

        let parameters = if other.parameters.len() > self.parameters.len() {
            other.parameters
        } else {
            self.parameters
        };

        let mut syntax = self.syntax;
        for line in other.syntax {
            if !syntax.contains(&line) {
                syntax.push(line);
            }
        }

        Member {
            version: if self.version.is_empty() { other.version } else { self.version },
            name: self.name,
            kind,
            return_type: non_empty(self.return_type).or(non_empty(other.return_type)),
            description: merge_text(self.description, other.description),
            parameters,
            syntax,
        }
    }

    pub fn to_element(&self) -> Element {
        let mut el = Element::new("member")
            .with_attr("name", &self.name)
            .with_attr("version", &self.version)
            .with_attr("type", self.kind.as_str())
            .with_child(
                Element::new("returns").with_child(Element::leaf("type", Some(self.returns()))),
            )
            .with_child(Element::leaf("description", self.description.as_deref()));

        for line in &self.syntax {
            el.push(Element::leaf("syntax", Some(line)));
        }

        let mut parameters = Element::new("parameters");
        for param in &self.parameters {
            parameters.push(param.to_element());
        }
        el.with_child(parameters)
    }
}

/// Documentation for one interface or dispinterface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub members: BTreeMap<String, Member>,
}

impl Interface {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description,
            members: BTreeMap::new(),
        }
    }

    /// Add a member, merging with an existing member of the same name
    pub fn add_member(&mut self, member: Member) {
        match self.members.remove(&member.name) {
            Some(existing) => {
                let merged = existing.merge(member);
                self.members.insert(merged.name.clone(), merged);
            }
            None => {
                self.members.insert(member.name.clone(), member);
            }
        }
    }

    pub fn merge(mut self, other: Interface) -> Interface {
        self.description = merge_text(self.description, other.description);
        for member in other.members.into_values() {
            self.add_member(member);
        }
        self
    }

    pub fn to_element(&self) -> Element {
        let mut members = Element::new("members");
        for member in self.members.values() {
            members.push(member.to_element());
        }

        Element::new("interface")
            .with_attr("name", &self.name)
            .with_attr("version", &self.version)
            .with_child(Element::leaf("description", self.description.as_deref()))
            .with_child(members)
    }
}

/// One enumerator of a typedef
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

impl Constant {
    pub fn to_element(&self) -> Element {
        Element::new("constant")
            .with_child(Element::leaf("name", Some(&self.name)))
            .with_child(Element::leaf("value", Some(&self.value)))
            .with_child(Element::leaf("description", self.description.as_deref()))
    }
}

/// Documentation for one enum typedef
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typedef {
    pub name: String,
    pub version: String,
    pub constants: Vec<Constant>,
}

impl Typedef {
    /// Union of constants by name; the left side's values are kept
    pub fn merge(mut self, other: Typedef) -> Typedef {
        for constant in other.constants {
            match self.constants.iter_mut().find(|c| c.name == constant.name) {
                Some(existing) => {
                    if existing.description.is_none() {
                        existing.description = constant.description;
                    }
                }
                None => self.constants.push(constant),
            }
        }
        self
    }

    pub fn to_element(&self) -> Element {
        let mut constants = Element::new("constants");
        for constant in &self.constants {
            constants.push(constant.to_element());
        }

        Element::new("typedef")
            .with_attr("name", &self.name)
            .with_attr("version", &self.version)
            .with_child(constants)
    }
}

/// A documented entity, persisted as one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Interface(Interface),
    Typedef(Typedef),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Interface(iface) => &iface.name,
            Entity::Typedef(td) => &td.name,
        }
    }

    /// Root element name of the rendered document
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Interface(_) => "interface",
            Entity::Typedef(_) => "typedef",
        }
    }

    /// Merge two contributions; gives both back when their kinds differ
    pub fn merge(self, other: Entity) -> std::result::Result<Entity, (Entity, Entity)> {
        match (self, other) {
            (Entity::Interface(a), Entity::Interface(b)) => Ok(Entity::Interface(a.merge(b))),
            (Entity::Typedef(a), Entity::Typedef(b)) => Ok(Entity::Typedef(a.merge(b))),
            (a, b) => Err((a, b)),
        }
    }

    pub fn to_element(&self) -> Element {
        match self {
            Entity::Interface(iface) => iface.to_element(),
            Entity::Typedef(td) => td.to_element(),
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

/// Join two descriptions with a newline unless one already holds the other
fn merge_text(left: Option<String>, right: Option<String>) -> Option<String> {
    match (non_empty(left), non_empty(right)) {
        (Some(l), Some(r)) => {
            if l.split('\n').any(|line| line == r) {
                Some(l)
            } else {
                Some(format!("{}\n{}", l, r))
            }
        }
        (l, r) => l.or(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &str, return_type: Option<&str>, parameters: Vec<Parameter>) -> Member {
        Member {
            name: name.to_string(),
            version: "2011".to_string(),
            kind: MemberKind::Property,
            return_type: return_type.map(str::to_string),
            description: None,
            parameters,
            syntax: vec![format!("{} {};", return_type.unwrap_or(VOID), name)],
        }
    }

    #[test]
    fn test_merge_keeps_longer_parameter_list() {
        let x = Parameter::new("long", "x");
        let a = property("Count", None, vec![x.clone()]);
        let b = property("Count", None, vec![]);

        assert_eq!(a.clone().merge(b.clone()).parameters, vec![x.clone()]);
        assert_eq!(b.merge(a).parameters, vec![x]);
    }

    #[test]
    fn test_merge_prefers_non_empty_type() {
        let getter = property("Count", Some("long"), vec![]);
        let setter = property("Count", None, vec![]);
        assert_eq!(setter.clone().merge(getter.clone()).returns(), "long");
        assert_eq!(getter.merge(setter).returns(), "long");

        let left = property("Name", Some("BSTR"), vec![]);
        let right = property("Name", Some("VARIANT"), vec![]);
        assert_eq!(left.merge(right).returns(), "BSTR");
    }

    #[test]
    fn test_merge_descriptions_and_syntax() {
        let mut a = property("Count", Some("long"), vec![]);
        a.description = Some("Gets the count".into());
        let mut b = property("Count", None, vec![]);
        b.description = Some("Sets the count".into());

        let merged = a.clone().merge(b);
        assert_eq!(merged.description.as_deref(), Some("Gets the count\nSets the count"));
        assert_eq!(merged.syntax, vec!["long Count;", "void Count;"]);

        let again = merged.clone().merge(a);
        assert_eq!(again.description, merged.description);
        assert_eq!(again.syntax, merged.syntax);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut m = property("Value", Some("VARIANT"), vec![Parameter::new("long", "index")]);
        m.description = Some("Indexed value".into());
        assert_eq!(m.clone().merge(m.clone()), m);
    }

    #[test]
    fn test_method_merged_with_property_is_property() {
        let mut method = property("Refresh", None, vec![]);
        method.kind = MemberKind::Method;
        let merged = method.merge(property("Refresh", None, vec![]));
        assert_eq!(merged.kind, MemberKind::Property);
    }

    #[test]
    fn test_add_member_merges_by_name() {
        let mut iface = Interface::new("IWidget", "2011", None);
        iface.add_member(property("Count", Some("long"), vec![]));
        iface.add_member(property("Count", None, vec![Parameter::new("long", "val")]));
        assert_eq!(iface.members.len(), 1);
        let count = &iface.members["Count"];
        assert_eq!(count.returns(), "long");
        assert_eq!(count.parameters.len(), 1);
    }

    #[test]
    fn test_typedef_merge_unions_constants() {
        let constant = |name: &str, value: &str| Constant {
            name: name.into(),
            value: value.into(),
            description: None,
        };
        let a = Typedef {
            name: "cwColor".into(),
            version: "2011".into(),
            constants: vec![constant("cwRed", "0"), constant("cwGreen", "1")],
        };
        let b = Typedef {
            constants: vec![constant("cwGreen", "7"), constant("cwBlue", "2")],
            ..a.clone()
        };
        let merged = a.merge(b);
        let names: Vec<_> = merged.constants.iter().map(|c| (c.name.as_str(), c.value.as_str())).collect();
        assert_eq!(names, vec![("cwRed", "0"), ("cwGreen", "1"), ("cwBlue", "2")]);
    }

    #[test]
    fn test_entity_merge_rejects_mixed_kinds() {
        let iface = Entity::Interface(Interface::new("Shared", "2011", None));
        let td = Entity::Typedef(Typedef {
            name: "Shared".into(),
            version: "2011".into(),
            constants: vec![],
        });
        let (left, right) = iface.merge(td).unwrap_err();
        assert_eq!((left.kind(), right.kind()), ("interface", "typedef"));
    }

    #[test]
    fn test_member_element_layout() {
        let mut p = Parameter::new("VARIANT", "index");
        p.optional = true;
        p.default = Some("0".into());
        let member = property("Item", Some("IDispatch"), vec![p]);
        let el = member.to_element();
        assert_eq!(el.attr("type"), Some("property"));
        assert_eq!(el.child("returns").unwrap().child_text("type"), Some("IDispatch"));
        let param = el.child("parameters").unwrap().child("parameter").unwrap();
        assert_eq!(param.attr("optional"), Some("true"));
        assert_eq!(param.child_text("default"), Some("0"));
        assert_eq!(param.child_text("name"), Some("index"));
        assert_eq!(param.child_text("type"), Some("VARIANT"));
    }
}
