//! MIDL Abstract Syntax Tree
//!
//! Typed nodes for the subset of MIDL used by COM type libraries. Each
//! grammar context has its own attribute enum, so checks like "is this a
//! property getter" are pattern matches rather than string comparisons.

use std::fmt;

use crate::error::Span;

/// Root of an IDL file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct File {
    pub definitions: Vec<Definition>,
}

/// Definitions, in the order the grammar tries them
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Library(Library),
    Typedef(Typedef),
    CoClass(CoClass),
    Interface(Interface),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Library(lib) => &lib.name,
            Definition::Typedef(td) => td.name(),
            Definition::CoClass(cc) => &cc.name,
            Definition::Interface(iface) => &iface.name,
        }
    }
}

/// COM type library block
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    pub attrs: Vec<LibraryAttribute>,
    pub name: String,
    pub definitions: Vec<Definition>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryAttribute {
    Uuid(String),
    Version(String),
    HelpString(String),
    HelpContext(i64),
    HelpFile(String),
    Lcid(i64),
}

/// `typedef enum` definition
#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub attrs: Vec<TypedefAttribute>,
    /// Tag following `enum`
    pub tag: Option<String>,
    /// Declarator following the closing brace
    pub alias: Option<String>,
    pub constants: Vec<EnumConstant>,
    pub span: Span,
}

impl Typedef {
    /// Documented name: the tag when present, else the alias
    pub fn name(&self) -> &str {
        self.tag
            .as_deref()
            .or(self.alias.as_deref())
            .unwrap_or_default()
    }

    pub fn helpstring(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            TypedefAttribute::HelpString(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedefAttribute {
    Uuid(String),
    Version(String),
    HelpString(String),
    /// Bare flags such as `public` or `v1_enum`
    Flag(String),
}

/// One enumerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub helpstring: Option<String>,
    pub name: String,
    pub value: Option<EnumValue>,
}

/// Explicit enumerator value. The modifier is kept as written and never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub base: ConstValue,
    pub modifier: Option<EnumModifier>,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(m) = &self.modifier {
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Integer(String),
    Hex(String),
    Str(String),
    Ident(String),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Integer(s)
            | ConstValue::Hex(s)
            | ConstValue::Str(s)
            | ConstValue::Ident(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumModifier {
    pub op: ArithOp,
    pub operand: String,
}

impl fmt::Display for EnumModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.operand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// Coclass definition (COM)
#[derive(Debug, Clone, PartialEq)]
pub struct CoClass {
    pub attrs: Vec<CoClassAttribute>,
    pub name: String,
    pub interfaces: Vec<CoClassInterface>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoClassAttribute {
    Uuid(String),
    HelpString(String),
    HelpContext(i64),
    Version(String),
    NonCreatable,
    Hidden,
    AppObject,
}

/// Interface listed inside a coclass
#[derive(Debug, Clone, PartialEq)]
pub struct CoClassInterface {
    pub attrs: Vec<InterfaceAttribute>,
    pub kind: InterfaceKind,
    pub name: String,
}

impl CoClassInterface {
    pub fn is_default(&self) -> bool {
        self.attrs.contains(&InterfaceAttribute::Default)
    }

    pub fn is_source(&self) -> bool {
        self.attrs.contains(&InterfaceAttribute::Source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Interface,
    Dispinterface,
}

impl InterfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Dispinterface => "dispinterface",
        }
    }
}

/// Interface or dispinterface definition
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub attrs: Vec<InterfaceAttribute>,
    pub kind: InterfaceKind,
    pub name: String,
    pub base: Option<String>,
    /// `None` for forward declarations
    pub body: Option<Vec<Function>>,
    pub span: Span,
}

impl Interface {
    pub fn helpstring(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            InterfaceAttribute::HelpString(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn functions(&self) -> &[Function] {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceAttribute {
    Uuid(String),
    HelpContext(i64),
    Version(String),
    HelpString(String),
    Dual,
    Object,
    PointerDefault(PointerKind),
    NonExtensible,
    Default,
    NonCreatable,
    Hidden,
    Source,
    OleAutomation,
    AppObject,
}

/// Pointer kind named by `pointer_default`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Ptr,
    Ref,
    Unique,
}

impl PointerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ptr => "ptr",
            Self::Ref => "ref",
            Self::Unique => "unique",
        }
    }
}

/// Which dispinterface section a function was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Methods,
    Properties,
}

/// Method or property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub attrs: Vec<FunctionAttribute>,
    pub return_type: TypeRef,
    pub name: String,
    pub params: Vec<Parameter>,
    pub section: Section,
    pub span: Span,
}

impl Function {
    pub fn is_property_accessor(&self) -> bool {
        self.attrs.iter().any(|a| {
            matches!(
                a,
                FunctionAttribute::PropGet
                    | FunctionAttribute::PropPut
                    | FunctionAttribute::PropPutRef
            )
        })
    }

    pub fn helpstring(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            FunctionAttribute::HelpString(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionAttribute {
    Id(String),
    HelpContext(i64),
    HelpString(String),
    PropGet,
    PropPut,
    PropPutRef,
    Hidden,
    Restricted,
    VarArg,
    Local,
    Source,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub attrs: Vec<ParameterAttribute>,
    pub ty: TypeRef,
    pub name: Option<String>,
}

impl Parameter {
    pub fn is_retval(&self) -> bool {
        self.attrs.contains(&ParameterAttribute::Retval)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            ParameterAttribute::DefaultValue(v) => Some(v.as_str()),
            _ => None,
        })
    }

    /// `[optional]` or `[defaultvalue(..)]`
    pub fn is_optional(&self) -> bool {
        self.attrs.iter().any(|a| {
            matches!(a, ParameterAttribute::Optional | ParameterAttribute::DefaultValue(_))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterAttribute {
    In,
    Out,
    Retval,
    Optional,
    Lcid,
    DefaultValue(String),
    /// Attribute this grammar does not interpret, e.g. `iid_is(riid)`
    Other(String),
}

/// Type reference. Pointer markers are consumed by the parser and not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Base { sign: Option<Sign>, base: BaseType },
    Com(ComType),
    SafeArray(Box<TypeRef>),
    Keyword { keyword: TagKeyword, tag: Option<String> },
    Named(String),
}

impl TypeRef {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Base { base: BaseType::Void, .. })
    }

    pub fn is_hresult(&self) -> bool {
        matches!(self, TypeRef::Com(ComType::HResult))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Base { sign: Some(sign), base } => {
                write!(f, "{} {}", sign.as_str(), base.as_str())
            }
            TypeRef::Base { sign: None, base } => f.write_str(base.as_str()),
            TypeRef::Com(com) => f.write_str(com.as_str()),
            TypeRef::SafeArray(inner) => write!(f, "SAFEARRAY({})", inner),
            TypeRef::Keyword { keyword, tag: Some(tag) } => {
                write!(f, "{} {}", keyword.as_str(), tag)
            }
            TypeRef::Keyword { keyword, tag: None } => f.write_str(keyword.as_str()),
            TypeRef::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Signed,
    Unsigned,
}

impl Sign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
        }
    }
}

/// Base (primitive) types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Void,
    Boolean,
    Byte,
    Char,
    WChar,
    Small,
    Short,
    Long,
    LongLong,
    Hyper,
    Int,
    Int8,
    Int16,
    Int32,
    Int3264,
    Int64,
    Float,
    Double,
    ErrorStatusT,
    HandleT,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::WChar => "wchar_t",
            Self::Small => "small",
            Self::Short => "short",
            Self::Long => "long",
            Self::LongLong => "long long",
            Self::Hyper => "hyper",
            Self::Int => "int",
            Self::Int8 => "__int8",
            Self::Int16 => "__int16",
            Self::Int32 => "__int32",
            Self::Int3264 => "__int3264",
            Self::Int64 => "__int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::ErrorStatusT => "error_status_t",
            Self::HandleT => "handle_t",
        }
    }
}

/// COM automation types with dedicated grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComType {
    HResult,
    Variant,
    VariantBool,
    Bstr,
}

impl ComType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HRESULT" => Some(Self::HResult),
            "VARIANT" => Some(Self::Variant),
            "VARIANT_BOOL" => Some(Self::VariantBool),
            "BSTR" => Some(Self::Bstr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HResult => "HRESULT",
            Self::Variant => "VARIANT",
            Self::VariantBool => "VARIANT_BOOL",
            Self::Bstr => "BSTR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKeyword {
    Struct,
    Union,
    Enum,
}

impl TagKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Enum => "enum",
        }
    }
}

impl File {
    /// Interfaces at any library depth, in declaration order
    pub fn interfaces(&self) -> Vec<&Interface> {
        let mut out = Vec::new();
        collect(&self.definitions, &mut |d| {
            if let Definition::Interface(iface) = d {
                out.push(iface);
            }
        });
        out
    }

    /// Typedefs at any library depth, in declaration order
    pub fn typedefs(&self) -> Vec<&Typedef> {
        let mut out = Vec::new();
        collect(&self.definitions, &mut |d| {
            if let Definition::Typedef(td) = d {
                out.push(td);
            }
        });
        out
    }
}

fn collect<'a>(defs: &'a [Definition], visit: &mut dyn FnMut(&'a Definition)) {
    for def in defs {
        visit(def);
        if let Definition::Library(lib) = def {
            collect(&lib.definitions, visit);
        }
    }
}
