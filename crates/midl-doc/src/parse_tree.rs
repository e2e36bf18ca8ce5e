//! Stage-1 output: the syntax tree as XML
//!
//! Bracketed MIDL attributes become XML attributes (flags as `"true"`,
//! valued attributes carry their value); types, names and values become
//! element text.

use midl::ast::*;

use crate::xml::Element;

pub fn file_to_element(file: &File) -> Element {
    Element::new("idl_file").with_child(definitions(&file.definitions))
}

fn definitions(defs: &[Definition]) -> Element {
    let mut el = Element::new("definitions");
    for def in defs {
        el.push(match def {
            Definition::Library(lib) => library(lib),
            Definition::Typedef(td) => typedef(td),
            Definition::CoClass(cc) => coclass(cc),
            Definition::Interface(iface) => interface(iface),
        });
    }
    el
}

fn with_attrs(mut el: Element, attrs: impl IntoIterator<Item = (String, String)>) -> Element {
    for (key, value) in attrs {
        el.set_attr(key, value);
    }
    el
}

fn flag(key: &str) -> (String, String) {
    (key.to_string(), "true".to_string())
}

fn valued(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn library(lib: &Library) -> Element {
    let attrs = lib.attrs.iter().map(|a| match a {
        LibraryAttribute::Uuid(v) => valued("uuid", v),
        LibraryAttribute::Version(v) => valued("version", v),
        LibraryAttribute::HelpString(v) => valued("helpstring", v),
        LibraryAttribute::HelpContext(v) => valued("helpcontext", v),
        LibraryAttribute::HelpFile(v) => valued("helpfile", v),
        LibraryAttribute::Lcid(v) => valued("lcid", v),
    });
    with_attrs(Element::new("library").with_attr("name", &lib.name), attrs)
        .with_child(definitions(&lib.definitions))
}

fn typedef(td: &Typedef) -> Element {
    let mut el = Element::new("typedef").with_attr("name", td.name());
    if let Some(tag) = &td.tag {
        el.set_attr("tag", tag);
    }
    if let Some(alias) = &td.alias {
        el.set_attr("alias", alias);
    }
    let attrs = td.attrs.iter().map(|a| match a {
        TypedefAttribute::Uuid(v) => valued("uuid", v),
        TypedefAttribute::Version(v) => valued("version", v),
        TypedefAttribute::HelpString(v) => valued("helpstring", v),
        TypedefAttribute::Flag(name) => flag(name),
    });
    let mut el = with_attrs(el, attrs);

    let mut constants = Element::new("constants");
    for c in &td.constants {
        let value = c.value.as_ref().map(ToString::to_string);
        constants.push(
            Element::new("constant")
                .with_child(Element::leaf("name", Some(&c.name)))
                .with_child(Element::leaf("value", value.as_deref()))
                .with_child(Element::leaf("helpstring", c.helpstring.as_deref())),
        );
    }
    el.push(constants);
    el
}

fn coclass(cc: &CoClass) -> Element {
    let attrs = cc.attrs.iter().map(|a| match a {
        CoClassAttribute::Uuid(v) => valued("uuid", v),
        CoClassAttribute::HelpString(v) => valued("helpstring", v),
        CoClassAttribute::HelpContext(v) => valued("helpcontext", v),
        CoClassAttribute::Version(v) => valued("version", v),
        CoClassAttribute::NonCreatable => flag("noncreatable"),
        CoClassAttribute::Hidden => flag("hidden"),
        CoClassAttribute::AppObject => flag("appobject"),
    });
    let mut el = with_attrs(Element::new("coclass").with_attr("name", &cc.name), attrs);

    for iface in &cc.interfaces {
        let member = Element::new("interface")
            .with_attr("kind", iface.kind.as_str())
            .with_attr("name", &iface.name);
        el.push(with_attrs(member, iface.attrs.iter().map(interface_attr)));
    }
    el
}

fn interface_attr(attr: &InterfaceAttribute) -> (String, String) {
    match attr {
        InterfaceAttribute::Uuid(v) => valued("uuid", v),
        InterfaceAttribute::HelpContext(v) => valued("helpcontext", v),
        InterfaceAttribute::Version(v) => valued("version", v),
        InterfaceAttribute::HelpString(v) => valued("helpstring", v),
        InterfaceAttribute::Dual => flag("dual"),
        InterfaceAttribute::Object => flag("object"),
        InterfaceAttribute::PointerDefault(kind) => valued("pointer_default", kind.as_str()),
        InterfaceAttribute::NonExtensible => flag("nonextensible"),
        InterfaceAttribute::Default => flag("default"),
        InterfaceAttribute::NonCreatable => flag("noncreatable"),
        InterfaceAttribute::Hidden => flag("hidden"),
        InterfaceAttribute::Source => flag("source"),
        InterfaceAttribute::OleAutomation => flag("oleautomation"),
        InterfaceAttribute::AppObject => flag("appobject"),
    }
}

fn interface(iface: &Interface) -> Element {
    let mut el = Element::new("interface")
        .with_attr("kind", iface.kind.as_str())
        .with_attr("name", &iface.name);
    if let Some(base) = &iface.base {
        el.set_attr("base_class", base);
    }
    if iface.body.is_none() {
        el.set_attr("forward", "true");
    }
    let mut el = with_attrs(el, iface.attrs.iter().map(interface_attr));

    for func in iface.functions() {
        el.push(function(func, iface.kind));
    }
    el
}

fn function(func: &Function, kind: InterfaceKind) -> Element {
    let mut el = Element::new("function").with_attr("name", &func.name);
    if kind == InterfaceKind::Dispinterface {
        let section = match func.section {
            Section::Methods => "methods",
            Section::Properties => "properties",
        };
        el.set_attr("section", section);
    }
    let attrs = func.attrs.iter().map(|a| match a {
        FunctionAttribute::Id(v) => valued("id", v),
        FunctionAttribute::HelpContext(v) => valued("helpcontext", v),
        FunctionAttribute::HelpString(v) => valued("helpstring", v),
        FunctionAttribute::PropGet => flag("propget"),
        FunctionAttribute::PropPut => flag("propput"),
        FunctionAttribute::PropPutRef => flag("propputref"),
        FunctionAttribute::Hidden => flag("hidden"),
        FunctionAttribute::Restricted => flag("restricted"),
        FunctionAttribute::VarArg => flag("vararg"),
        FunctionAttribute::Local => flag("local"),
        FunctionAttribute::Source => flag("source"),
    });
    let retval = func.return_type.to_string();
    let el = with_attrs(el, attrs).with_child(Element::leaf("retval", Some(&retval)));

    let mut params = Element::new("parameters");
    for param in &func.params {
        params.push(parameter(param));
    }
    el.with_child(params)
}

fn parameter(param: &Parameter) -> Element {
    let attrs = param.attrs.iter().map(|a| match a {
        ParameterAttribute::In => flag("in"),
        ParameterAttribute::Out => flag("out"),
        ParameterAttribute::Retval => flag("retval"),
        ParameterAttribute::Optional => flag("optional"),
        ParameterAttribute::Lcid => flag("lcid"),
        ParameterAttribute::DefaultValue(v) => valued("defaultvalue", v),
        // `iid_is(riid)` becomes iid_is="riid"
        ParameterAttribute::Other(text) => match text.split_once('(') {
            Some((key, rest)) => valued(key, rest.trim_end_matches(')')),
            None => flag(text),
        },
    });
    with_attrs(Element::new("parameter"), attrs)
        .with_child(Element::leaf("type", Some(&param.ty.to_string())))
        .with_child(Element::leaf("name", param.name.as_deref()))
}
