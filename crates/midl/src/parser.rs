//! MIDL Parser
//!
//! Recursive-descent parser over the token stream. At each definition
//! position the parser tries, in order: library, typedef(enum), coclass,
//! interface/dispinterface. It does not recover from errors; the first
//! mismatch is reported with its position and what was expected.

use tracing::debug;

use crate::ast::*;
use crate::error::{MidlError, Result, Span};
use crate::lexer::{Lexer, SpannedToken, Token};

/// Parse an IDL string into an AST
pub fn parse(input: &str) -> Result<File> {
    let mut lexer = Lexer::new(input);
    let tokens = lexer.tokenize()?;
    let mut parser = Parser::new(input, &tokens);
    let file = parser.parse_file()?;
    debug!(definitions = file.definitions.len(), "parsed IDL source");
    Ok(file)
}

/// Whether an attribute block needs commas between entries
#[derive(Clone, Copy, PartialEq, Eq)]
enum Separators {
    Required,
    Optional,
}

/// Parser state
struct Parser<'a> {
    input: &'a str,
    tokens: &'a [SpannedToken],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: &'a [SpannedToken]) -> Self {
        Self { input, tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or(self.input.len())
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn error(&self, expected: impl Into<String>) -> MidlError {
        MidlError::parse(
            self.input,
            self.current_pos(),
            expected,
            self.current().describe(),
        )
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(expected.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.current() {
            Token::Ident(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn optional_ident(&mut self) -> Option<String> {
        match self.current() {
            Token::Ident(s) => {
                let s = s.clone();
                self.advance();
                Some(s)
            }
            _ => None,
        }
    }

    fn is_word(&self, offset: usize, word: &str) -> bool {
        matches!(self.peek(offset), Token::Ident(s) if s == word)
    }

    /// `word:` section label inside a dispinterface body
    fn is_label(&self, word: &str) -> bool {
        self.is_word(0, word) && *self.peek(1) == Token::Colon
    }

    fn expect_label(&mut self, word: &str) -> Result<()> {
        if self.is_label(word) {
            self.pos += 2;
            Ok(())
        } else {
            Err(self.error(format!("`{}:`", word)))
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous_end())
    }

    fn parse_file(&mut self) -> Result<File> {
        let definitions = self.parse_definitions()?;

        if *self.current() != Token::Eof {
            return Err(self.error(
                "definition (library, typedef, coclass, interface or dispinterface)",
            ));
        }

        Ok(File { definitions })
    }

    /// Definitions until none matches
    fn parse_definitions(&mut self) -> Result<Vec<Definition>> {
        let mut definitions = Vec::new();

        loop {
            if self.skip_cpp_quote()? {
                continue;
            }

            let definition = match self.definition_keyword() {
                Some(Token::Library) => Definition::Library(self.parse_library()?),
                Some(Token::Typedef) => Definition::Typedef(self.parse_typedef()?),
                Some(Token::Coclass) => Definition::CoClass(self.parse_coclass()?),
                Some(Token::Interface | Token::Dispinterface) => {
                    Definition::Interface(self.parse_interface()?)
                }
                _ => break,
            };
            definitions.push(definition);
        }

        Ok(definitions)
    }

    /// The keyword that follows an optional leading attribute block
    fn definition_keyword(&self) -> Option<Token> {
        if *self.current() == Token::Typedef {
            return Some(Token::Typedef);
        }

        let mut i = 0;
        if *self.peek(0) == Token::LBracket {
            let mut depth = 0usize;
            loop {
                match self.peek(i) {
                    Token::LBracket => depth += 1,
                    Token::RBracket => {
                        depth -= 1;
                        if depth == 0 {
                            i += 1;
                            break;
                        }
                    }
                    Token::Eof => return None,
                    _ => {}
                }
                i += 1;
            }
        }

        match self.peek(i) {
            tok @ (Token::Library | Token::Coclass | Token::Interface | Token::Dispinterface) => {
                Some(tok.clone())
            }
            _ => None,
        }
    }

    /// `cpp_quote("...")` passes text through to generated headers; nothing to document
    fn skip_cpp_quote(&mut self) -> Result<bool> {
        if !(self.is_word(0, "cpp_quote") && *self.peek(1) == Token::LParen) {
            return Ok(false);
        }
        self.pos += 2;
        match self.current() {
            Token::StringLiteral(_) | Token::UuidLiteral(_) => self.advance(),
            _ => return Err(self.error("string")),
        }
        self.expect(&Token::RParen)?;
        self.eat(&Token::Semicolon);
        Ok(true)
    }

    fn parse_attr_list<T>(
        &mut self,
        separators: Separators,
        mut parse_one: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.expect(&Token::LBracket)?;
        let mut attrs = Vec::new();

        while *self.current() != Token::RBracket {
            attrs.push(parse_one(self)?);

            if self.eat(&Token::Comma) {
                continue;
            }
            if separators == Separators::Required && *self.current() != Token::RBracket {
                return Err(self.error("`,` or `]`"));
            }
        }

        self.expect(&Token::RBracket)?;
        Ok(attrs)
    }

    /// Attribute name plus the position it started at
    fn attr_name(&mut self, context: &str) -> Result<(String, usize)> {
        let start = self.current_pos();
        match self.current() {
            Token::Ident(s) => {
                let s = s.clone();
                self.advance();
                Ok((s, start))
            }
            _ => Err(self.error(format!("{} attribute", context))),
        }
    }

    fn unknown_attr(&self, context: &str, name: &str, start: usize) -> MidlError {
        MidlError::parse(
            self.input,
            start,
            format!("{} attribute", context),
            format!("identifier `{}`", name),
        )
    }

    fn parse_library_attribute(&mut self) -> Result<LibraryAttribute> {
        let (name, start) = self.attr_name("library")?;
        let attr = match name.as_str() {
            "uuid" => LibraryAttribute::Uuid(self.parse_uuid_arg()?),
            "version" => LibraryAttribute::Version(self.parse_version_arg()?),
            "helpstring" => LibraryAttribute::HelpString(self.parse_string_arg()?),
            "helpcontext" => LibraryAttribute::HelpContext(self.parse_int_arg()?),
            "helpfile" => LibraryAttribute::HelpFile(self.parse_string_arg()?),
            "lcid" => LibraryAttribute::Lcid(self.parse_int_arg()?),
            _ => return Err(self.unknown_attr("library", &name, start)),
        };
        Ok(attr)
    }

    fn parse_typedef_attribute(&mut self) -> Result<TypedefAttribute> {
        let (name, _) = self.attr_name("typedef")?;
        let attr = match name.as_str() {
            "uuid" => TypedefAttribute::Uuid(self.parse_uuid_arg()?),
            "version" => TypedefAttribute::Version(self.parse_version_arg()?),
            "helpstring" => TypedefAttribute::HelpString(self.parse_string_arg()?),
            _ => TypedefAttribute::Flag(name),
        };
        Ok(attr)
    }

    fn parse_coclass_attribute(&mut self) -> Result<CoClassAttribute> {
        let (name, start) = self.attr_name("coclass")?;
        let attr = match name.as_str() {
            "uuid" => CoClassAttribute::Uuid(self.parse_uuid_arg()?),
            "helpstring" => CoClassAttribute::HelpString(self.parse_string_arg()?),
            "helpcontext" => CoClassAttribute::HelpContext(self.parse_int_arg()?),
            "version" => CoClassAttribute::Version(self.parse_version_arg()?),
            "noncreatable" => CoClassAttribute::NonCreatable,
            "hidden" => CoClassAttribute::Hidden,
            "appobject" => CoClassAttribute::AppObject,
            _ => return Err(self.unknown_attr("coclass", &name, start)),
        };
        Ok(attr)
    }

    fn parse_interface_attribute(&mut self) -> Result<InterfaceAttribute> {
        let (name, start) = self.attr_name("interface")?;
        let attr = match name.as_str() {
            "uuid" => InterfaceAttribute::Uuid(self.parse_uuid_arg()?),
            "helpcontext" => InterfaceAttribute::HelpContext(self.parse_int_arg()?),
            "version" => InterfaceAttribute::Version(self.parse_version_arg()?),
            "helpstring" => InterfaceAttribute::HelpString(self.parse_string_arg()?),
            "dual" => InterfaceAttribute::Dual,
            "object" => InterfaceAttribute::Object,
            "nonextensible" => InterfaceAttribute::NonExtensible,
            "default" => InterfaceAttribute::Default,
            "noncreatable" => InterfaceAttribute::NonCreatable,
            "hidden" => InterfaceAttribute::Hidden,
            "source" => InterfaceAttribute::Source,
            "oleautomation" => InterfaceAttribute::OleAutomation,
            "appobject" => InterfaceAttribute::AppObject,
            "pointer_default" => {
                self.expect(&Token::LParen)?;
                let kind = match self.current() {
                    Token::Ident(s) if s == "ptr" => PointerKind::Ptr,
                    Token::Ident(s) if s == "ref" => PointerKind::Ref,
                    Token::Ident(s) if s == "unique" => PointerKind::Unique,
                    _ => return Err(self.error("`ptr`, `ref` or `unique`")),
                };
                self.advance();
                self.expect(&Token::RParen)?;
                InterfaceAttribute::PointerDefault(kind)
            }
            _ => return Err(self.unknown_attr("interface", &name, start)),
        };
        Ok(attr)
    }

    fn parse_function_attribute(&mut self) -> Result<FunctionAttribute> {
        let (name, start) = self.attr_name("function")?;
        let attr = match name.as_str() {
            "id" => {
                self.expect(&Token::LParen)?;
                let id = match self.current() {
                    Token::Ident(s) | Token::Integer(s) | Token::HexInteger(s) => s.clone(),
                    _ => return Err(self.error("dispatch id")),
                };
                self.advance();
                self.expect(&Token::RParen)?;
                FunctionAttribute::Id(id)
            }
            "helpcontext" => FunctionAttribute::HelpContext(self.parse_int_arg()?),
            "helpstring" => FunctionAttribute::HelpString(self.parse_string_arg()?),
            "propget" => FunctionAttribute::PropGet,
            "propput" => FunctionAttribute::PropPut,
            "propputref" => FunctionAttribute::PropPutRef,
            "hidden" => FunctionAttribute::Hidden,
            "restricted" => FunctionAttribute::Restricted,
            "vararg" => FunctionAttribute::VarArg,
            "local" => FunctionAttribute::Local,
            "source" => FunctionAttribute::Source,
            _ => return Err(self.unknown_attr("function", &name, start)),
        };
        Ok(attr)
    }

    fn parse_parameter_attribute(&mut self) -> Result<ParameterAttribute> {
        let (name, start) = self.attr_name("parameter")?;
        let attr = match name.as_str() {
            "in" => ParameterAttribute::In,
            "out" => ParameterAttribute::Out,
            "retval" => ParameterAttribute::Retval,
            "optional" => ParameterAttribute::Optional,
            "lcid" => ParameterAttribute::Lcid,
            "defaultvalue" => {
                self.expect(&Token::LParen)?;
                let value = self.parse_const_value()?;
                self.expect(&Token::RParen)?;
                ParameterAttribute::DefaultValue(value.to_string())
            }
            "iid_is" => {
                self.expect(&Token::LParen)?;
                let arg = self.expect_ident()?;
                self.expect(&Token::RParen)?;
                ParameterAttribute::Other(format!("iid_is({})", arg))
            }
            _ => return Err(self.unknown_attr("parameter", &name, start)),
        };
        Ok(attr)
    }

    fn parse_uuid_arg(&mut self) -> Result<String> {
        self.expect(&Token::LParen)?;
        let uuid = match self.current() {
            Token::UuidLiteral(s) => s.clone(),
            _ => return Err(self.error("uuid")),
        };
        self.advance();
        self.expect(&Token::RParen)?;
        Ok(uuid)
    }

    /// `version(1.0)` or `version(SOME_MACRO)`
    fn parse_version_arg(&mut self) -> Result<String> {
        self.expect(&Token::LParen)?;
        let version = match self.current() {
            Token::Decimal(s) | Token::Integer(s) | Token::Ident(s) => s.clone(),
            _ => return Err(self.error("version number")),
        };
        self.advance();
        self.expect(&Token::RParen)?;
        Ok(version)
    }

    fn parse_string_arg(&mut self) -> Result<String> {
        self.expect(&Token::LParen)?;
        let s = match self.current() {
            Token::StringLiteral(s) | Token::UuidLiteral(s) => s.clone(),
            _ => return Err(self.error("string")),
        };
        self.advance();
        self.expect(&Token::RParen)?;
        Ok(s)
    }

    fn parse_int_arg(&mut self) -> Result<i64> {
        self.expect(&Token::LParen)?;
        let start = self.current_pos();
        let text = self.parse_integer_text()?;
        self.expect(&Token::RParen)?;
        parse_int(&text).ok_or_else(|| {
            MidlError::parse(self.input, start, "integer", format!("number `{}`", text))
        })
    }

    /// Integer literal text, with an optional leading minus
    fn parse_integer_text(&mut self) -> Result<String> {
        let negative = self.eat(&Token::Minus);
        match self.current() {
            Token::Integer(s) | Token::HexInteger(s) => {
                let text = if negative { format!("-{}", s) } else { s.clone() };
                self.advance();
                Ok(text)
            }
            _ => Err(self.error("integer")),
        }
    }

    /// Integer, hex, string or identifier constant
    fn parse_const_value(&mut self) -> Result<ConstValue> {
        let value = match self.current() {
            Token::Minus => match self.peek(1) {
                Token::Integer(s) => ConstValue::Integer(format!("-{}", s)),
                Token::HexInteger(s) => ConstValue::Hex(format!("-{}", s)),
                _ => {
                    self.advance();
                    return Err(self.error("integer"));
                }
            },
            Token::Integer(s) | Token::Decimal(s) => ConstValue::Integer(s.clone()),
            Token::HexInteger(s) => ConstValue::Hex(s.clone()),
            Token::StringLiteral(s) | Token::UuidLiteral(s) => ConstValue::Str(s.clone()),
            Token::Ident(s) => ConstValue::Ident(s.clone()),
            _ => return Err(self.error("constant value")),
        };
        if *self.current() == Token::Minus {
            self.advance();
        }
        self.advance();
        Ok(value)
    }

    fn parse_library(&mut self) -> Result<Library> {
        let start = self.current_pos();
        let attrs = if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Optional, Self::parse_library_attribute)?
        } else {
            Vec::new()
        };

        self.expect(&Token::Library)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;

        let definitions = self.parse_definitions()?;

        if *self.current() != Token::RBrace {
            return Err(self.error("definition or `}`"));
        }
        self.advance();
        self.eat(&Token::Semicolon);

        Ok(Library {
            attrs,
            name,
            definitions,
            span: self.span_from(start),
        })
    }

    fn parse_typedef(&mut self) -> Result<Typedef> {
        let start = self.current_pos();
        self.expect(&Token::Typedef)?;

        let attrs = if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Required, Self::parse_typedef_attribute)?
        } else {
            Vec::new()
        };

        if !self.eat(&Token::Enum) {
            return Err(self.error("`enum`"));
        }
        let tag = self.optional_ident();

        self.expect(&Token::LBrace)?;
        let mut constants = Vec::new();
        while *self.current() != Token::RBrace {
            constants.push(self.parse_enum_constant()?);
        }
        self.expect(&Token::RBrace)?;

        let alias = self.optional_ident();
        // Further declarators (`, *PColor`) name pointer types; not documented
        while self.eat(&Token::Comma) {
            while self.eat(&Token::Star) {}
            self.expect_ident()?;
        }
        self.expect(&Token::Semicolon)?;

        if tag.is_none() && alias.is_none() {
            return Err(MidlError::parse(
                self.input,
                start,
                "named enum typedef",
                "anonymous enum",
            ));
        }

        Ok(Typedef {
            attrs,
            tag,
            alias,
            constants,
            span: self.span_from(start),
        })
    }

    fn parse_enum_constant(&mut self) -> Result<EnumConstant> {
        let helpstring = if self.eat(&Token::LBracket) {
            if !self.is_word(0, "helpstring") {
                return Err(self.error("`helpstring`"));
            }
            self.advance();
            let s = self.parse_string_arg()?;
            self.expect(&Token::RBracket)?;
            Some(s)
        } else {
            None
        };

        let name = self.expect_ident()?;

        let value = if self.eat(&Token::Equals) {
            let base = self.parse_const_value()?;
            let op = match self.current() {
                Token::Plus => Some(ArithOp::Add),
                Token::Minus => Some(ArithOp::Sub),
                Token::Star => Some(ArithOp::Mul),
                Token::Slash => Some(ArithOp::Div),
                _ => None,
            };
            let modifier = match op {
                Some(op) => {
                    self.advance();
                    let operand = self.parse_integer_text()?;
                    Some(EnumModifier { op, operand })
                }
                None => None,
            };
            Some(EnumValue { base, modifier })
        } else {
            None
        };

        self.eat(&Token::Comma);

        Ok(EnumConstant {
            helpstring,
            name,
            value,
        })
    }

    fn parse_coclass(&mut self) -> Result<CoClass> {
        let start = self.current_pos();
        let attrs = if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Optional, Self::parse_coclass_attribute)?
        } else {
            Vec::new()
        };

        self.expect(&Token::Coclass)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;

        let mut interfaces = Vec::new();
        while *self.current() != Token::RBrace {
            let iface_attrs = if *self.current() == Token::LBracket {
                self.parse_attr_list(Separators::Optional, Self::parse_interface_attribute)?
            } else {
                Vec::new()
            };
            let kind = self.parse_interface_kind()?;
            let iface_name = self.expect_ident()?;
            self.expect(&Token::Semicolon)?;

            interfaces.push(CoClassInterface {
                attrs: iface_attrs,
                kind,
                name: iface_name,
            });
        }

        self.expect(&Token::RBrace)?;
        self.eat(&Token::Semicolon);

        Ok(CoClass {
            attrs,
            name,
            interfaces,
            span: self.span_from(start),
        })
    }

    fn parse_interface_kind(&mut self) -> Result<InterfaceKind> {
        let kind = match self.current() {
            Token::Interface => InterfaceKind::Interface,
            Token::Dispinterface => InterfaceKind::Dispinterface,
            _ => return Err(self.error("`interface` or `dispinterface`")),
        };
        self.advance();
        Ok(kind)
    }

    fn parse_interface(&mut self) -> Result<Interface> {
        let start = self.current_pos();
        let attrs = if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Optional, Self::parse_interface_attribute)?
        } else {
            Vec::new()
        };

        let kind = self.parse_interface_kind()?;
        let name = self.expect_ident()?;

        let base = if self.eat(&Token::Colon) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        let body = if *self.current() == Token::LBrace {
            Some(self.parse_interface_body()?)
        } else {
            None
        };

        self.eat(&Token::Semicolon);

        Ok(Interface {
            attrs,
            kind,
            name,
            base,
            body,
            span: self.span_from(start),
        })
    }

    /// Flat function list, or `properties:` ... `methods:` ... for dispinterfaces
    fn parse_interface_body(&mut self) -> Result<Vec<Function>> {
        self.expect(&Token::LBrace)?;

        let mut functions = Vec::new();
        if self.is_label("properties") {
            self.expect_label("properties")?;
            functions = self.parse_functions(Section::Properties)?;
        }
        if self.is_label("methods") {
            self.expect_label("methods")?;
        }
        functions.extend(self.parse_functions(Section::Methods)?);

        if *self.current() != Token::RBrace {
            return Err(self.error("function declaration or `}`"));
        }
        self.advance();
        Ok(functions)
    }

    fn parse_functions(&mut self, section: Section) -> Result<Vec<Function>> {
        let mut functions = Vec::new();
        while !matches!(self.current(), Token::RBrace | Token::Eof) && !self.is_label("methods") {
            functions.push(self.parse_function(section)?);
        }
        Ok(functions)
    }

    fn parse_function(&mut self, section: Section) -> Result<Function> {
        let start = self.current_pos();
        let attrs = if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Required, Self::parse_function_attribute)?
        } else {
            Vec::new()
        };

        let return_type = self.parse_type()?;
        let name = self.expect_ident()?;

        // Parentheses are omitted entirely for parameterless declarations
        let mut params = Vec::new();
        if self.eat(&Token::LParen) {
            if *self.current() != Token::RParen {
                loop {
                    params.push(self.parse_parameter()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(&Token::RParen)?;
        }

        self.expect(&Token::Semicolon)?;

        Ok(Function {
            attrs,
            return_type,
            name,
            params,
            section,
            span: self.span_from(start),
        })
    }

    fn parse_parameter(&mut self) -> Result<Parameter> {
        let attrs = if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Required, Self::parse_parameter_attribute)?
        } else {
            Vec::new()
        };
        // Some sources repeat the attribute block; the repeat is ignored
        if *self.current() == Token::LBracket {
            self.parse_attr_list(Separators::Required, Self::parse_parameter_attribute)?;
        }

        let ty = self.parse_type()?;
        let name = self.optional_ident();

        Ok(Parameter { attrs, ty, name })
    }

    /// Type reference; trailing `*` markers are consumed and dropped
    fn parse_type(&mut self) -> Result<TypeRef> {
        let ty = self.parse_type_core()?;
        while self.eat(&Token::Star) {}
        Ok(ty)
    }

    fn parse_type_core(&mut self) -> Result<TypeRef> {
        let sign = match self.current() {
            Token::Unsigned => Some(Sign::Unsigned),
            Token::Signed => Some(Sign::Signed),
            _ => None,
        };
        if sign.is_some() {
            self.advance();
        }

        let base = match self.current() {
            Token::Void => BaseType::Void,
            Token::Boolean => BaseType::Boolean,
            Token::Byte => BaseType::Byte,
            Token::Char => BaseType::Char,
            Token::Wchar_t => BaseType::WChar,
            Token::Small => BaseType::Small,
            Token::Short => BaseType::Short,
            Token::Long => {
                if *self.peek(1) == Token::Long {
                    self.advance();
                    BaseType::LongLong
                } else {
                    BaseType::Long
                }
            }
            Token::Hyper => BaseType::Hyper,
            Token::Int => BaseType::Int,
            Token::Int8 => BaseType::Int8,
            Token::Int16 => BaseType::Int16,
            Token::Int32 => BaseType::Int32,
            Token::Int3264 => BaseType::Int3264,
            Token::Int64 => BaseType::Int64,
            Token::Float => BaseType::Float,
            Token::Double => BaseType::Double,
            Token::Error_status_t => BaseType::ErrorStatusT,
            Token::Handle_t => BaseType::HandleT,
            // `unsigned` on its own means `unsigned int`
            _ if sign.is_some() => return Ok(TypeRef::Base { sign, base: BaseType::Int }),
            _ => return self.parse_named_type(),
        };
        self.advance();
        Ok(TypeRef::Base { sign, base })
    }

    fn parse_named_type(&mut self) -> Result<TypeRef> {
        let keyword = match self.current() {
            Token::Struct => Some(TagKeyword::Struct),
            Token::Union => Some(TagKeyword::Union),
            Token::Enum => Some(TagKeyword::Enum),
            _ => None,
        };
        if let Some(keyword) = keyword {
            self.advance();
            // `struct POINT* pt`: the tag is followed by a name or a pointer marker
            let tag = match (self.current(), self.peek(1)) {
                (Token::Ident(tag), Token::Ident(_) | Token::Star) => {
                    let tag = tag.clone();
                    self.advance();
                    Some(tag)
                }
                _ => None,
            };
            return Ok(TypeRef::Keyword { keyword, tag });
        }

        let name = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => return Err(self.error("type")),
        };
        self.advance();

        if name == "SAFEARRAY" && *self.current() == Token::LParen {
            self.advance();
            let inner = self.parse_type()?;
            self.expect(&Token::RParen)?;
            return Ok(TypeRef::SafeArray(Box::new(inner)));
        }

        Ok(match ComType::from_name(&name) {
            Some(com) => TypeRef::Com(com),
            None => TypeRef::Named(name),
        })
    }
}

/// Decimal or `0x` hex integer text, with optional sign and C suffixes
fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits.trim_end_matches(['u', 'U', 'l', 'L']);
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    Some(if negative { -value } else { value })
}
