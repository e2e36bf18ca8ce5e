//! Documentation mapper
//!
//! Turns syntax-tree nodes into documentation entities. The COM conventions
//! live here: `[retval]` parameters become the return type, and property
//! accessors returning `HRESULT` lose their implicit value parameter.

use midl::ast;
use tracing::debug;

use crate::config::DocConfig;
use crate::model::{Constant, Entity, Interface, Member, MemberKind, Parameter, Typedef};

/// Map every interface with a body and every typedef, at any library depth
pub fn map_file(file: &ast::File, config: &DocConfig) -> Vec<Entity> {
    let mut entities = Vec::new();
    for iface in file.interfaces() {
        match map_interface(iface, config) {
            Some(doc) => entities.push(Entity::Interface(doc)),
            None => debug!(interface = %iface.name, "skipping forward declaration"),
        }
    }
    for td in file.typedefs() {
        entities.push(Entity::Typedef(map_typedef(td, config)));
    }
    entities
}

/// `None` for forward declarations
pub fn map_interface(iface: &ast::Interface, config: &DocConfig) -> Option<Interface> {
    let functions = iface.body.as_ref()?;

    let mut doc = Interface::new(
        iface.name.clone(),
        config.version.clone(),
        iface.helpstring().map(str::to_string),
    );
    for func in functions {
        doc.add_member(map_function(func, config));
    }

    debug!(interface = %doc.name, members = doc.members.len(), "mapped interface");
    Some(doc)
}

pub fn map_function(func: &ast::Function, config: &DocConfig) -> Member {
    let kind = if func.is_property_accessor() || func.section == ast::Section::Properties {
        MemberKind::Property
    } else {
        MemberKind::Method
    };

    let mut return_type = None;
    let mut parameters = Vec::new();
    for param in &func.params {
        if param.name.is_none() && param.ty.is_void() {
            continue;
        }
        let mapped = map_parameter(param);
        if mapped.is_retval {
            return_type = Some(mapped.ty);
        } else {
            parameters.push(mapped);
        }
    }

    if return_type.is_none() && !func.return_type.is_hresult() && !func.return_type.is_void() {
        return_type = Some(func.return_type.to_string());
    }

    // put/get accessors pass the property value as their only argument
    if kind == MemberKind::Property && func.return_type.is_hresult() && parameters.len() == 1 {
        parameters.clear();
    }

    let mut member = Member {
        name: func.name.clone(),
        version: config.version.clone(),
        kind,
        return_type,
        description: func.helpstring().map(str::to_string),
        parameters,
        syntax: Vec::new(),
    };
    member.syntax.push(render_syntax(&member));
    member
}

fn map_parameter(param: &ast::Parameter) -> Parameter {
    Parameter {
        ty: param.ty.to_string(),
        name: param.name.clone(),
        optional: param.is_optional(),
        default: param.default_value().map(str::to_string),
        is_retval: param.is_retval(),
    }
}

/// C-style declaration shown in the member's `<syntax>`
pub fn render_syntax(member: &Member) -> String {
    let ret = member.returns();
    if member.parameters.is_empty() {
        return match member.kind {
            MemberKind::Property => format!("{} {};", ret, member.name),
            MemberKind::Method => format!("{} {}();", ret, member.name),
        };
    }

    let params: Vec<String> = member
        .parameters
        .iter()
        .map(|p| match &p.name {
            Some(name) => format!("    {} {}", p.ty, name),
            None => format!("    {}", p.ty),
        })
        .collect();
    format!("{} {}(\n{}\n);", ret, member.name, params.join(",\n"))
}

pub fn map_typedef(td: &ast::Typedef, config: &DocConfig) -> Typedef {
    let constants = td
        .constants
        .iter()
        .enumerate()
        .map(|(index, c)| Constant {
            name: c.name.clone(),
            value: c
                .value
                .as_ref()
                .map_or_else(|| index.to_string(), ToString::to_string),
            description: c.helpstring.clone(),
        })
        .collect();

    debug!(typedef = td.name(), "mapped typedef");
    Typedef {
        name: td.name().to_string(),
        version: config.version.clone(),
        constants,
    }
}
