//! Grammar of generic signatures and type descriptors
//!
//! ```text
//! ClassSignature   := FormalTypeParams? ClassTypeSig ClassTypeSig*
//! MethodSignature  := FormalTypeParams? '(' TypeSig* ')' ReturnType ('^' FieldTypeSig)*
//! FormalTypeParams := '<' (Identifier ':' FieldTypeSig? (':' FieldTypeSig)*)+ '>'
//! FieldTypeSig     := ClassTypeSig | '[' TypeSig | 'T' Identifier ';'
//! ClassTypeSig     := 'L' (Identifier '/')* Identifier TypeArgs? ('.' Identifier TypeArgs?)* ';'
//! TypeArgs         := '<' ('*' | ('+' | '-')? FieldTypeSig)+ '>'
//! TypeSig          := BaseType | FieldTypeSig
//! ReturnType       := 'V' | TypeSig
//! ```
//!
//! Plain descriptors (`[Ljava/lang/String;`) are the subset of `TypeSig`
//! without type arguments or variables.

use combine::{
    between, many, many1, optional, parser, parser::range::recognize, satisfy, satisfy_map,
    sep_by1, skip_many1, token, ParseError, Parser, RangeStream, StdParseResult,
};

use crate::errors::{Error, Result};
use crate::model::Primitive;

/// A parsed type signature, before any name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(Primitive),
    Class(ClassTypeSignature),
    Array(Box<TypeSignature>),
    TypeVariable(String),
}

/// `Ljava/util/Map<TK;TV;>.Entry;`: a package and one or more nested segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub package: Vec<String>,
    /// Outermost class first; never empty
    pub segments: Vec<SimpleClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(TypeSignature),
    /// `+`, i.e. `? extends`
    Extends(TypeSignature),
    /// `-`, i.e. `? super`
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalTypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<FormalTypeParameter>,
    pub superclass: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<FormalTypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `Base(Void)` for `V`
    pub return_type: TypeSignature,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    parse_complete(parser(class_signature), signature)
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature> {
    parse_complete(parser(method_signature), signature)
}

pub fn parse_field_signature(signature: &str) -> Result<TypeSignature> {
    parse_complete(parser(field_type_signature), signature)
}

/// Parse a non-void descriptor such as `I` or `[Ljava/lang/String;`
pub fn parse_type_descriptor(descriptor: &str) -> Result<TypeSignature> {
    parse_complete(parser(type_signature), descriptor)
}

/// Parse a descriptor that may also be `V`
pub fn parse_return_descriptor(descriptor: &str) -> Result<TypeSignature> {
    parse_complete(parser(return_type), descriptor)
}

fn parse_complete<'a, P>(mut p: P, input: &'a str) -> Result<P::Output>
where
    P: Parser<&'a str>,
{
    p.parse(input)
        .map_err(|e| Error::ParseFailed(format!("Failed to parse '{input}': {e}")))
        .and_then(|(res, tail)| {
            if tail.is_empty() {
                Ok(res)
            } else {
                Err(Error::ParseFailed(format!(
                    "Trailing input: '{tail}' while parsing '{input}'"
                )))
            }
        })
}

fn is_identifier_char(c: char) -> bool {
    !matches!(c, ':' | '/' | ';' | '<' | '>' | '.')
}

fn identifier<'a, S>(input: &mut S) -> StdParseResult<String, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    recognize(skip_many1(satisfy(is_identifier_char)))
        .map(|s: &'a str| s.to_owned())
        .parse_stream(input)
        .into()
}

fn base_type<'a, S>(input: &mut S) -> StdParseResult<Primitive, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    satisfy_map(|c| Primitive::from_descriptor(c).filter(|p| *p != Primitive::Void))
        .parse_stream(input)
        .into()
}

fn type_signature<'a, S>(input: &mut S) -> StdParseResult<TypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    parser(base_type)
        .map(TypeSignature::Base)
        .or(parser(field_type_signature))
        .parse_stream(input)
        .into()
}

fn return_type<'a, S>(input: &mut S) -> StdParseResult<TypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    token('V')
        .map(|_| TypeSignature::Base(Primitive::Void))
        .or(parser(type_signature))
        .parse_stream(input)
        .into()
}

fn field_type_signature<'a, S>(input: &mut S) -> StdParseResult<TypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    parser(class_type_signature)
        .map(TypeSignature::Class)
        .or(parser(array_type_signature))
        .or(parser(type_variable_signature))
        .parse_stream(input)
        .into()
}

fn array_type_signature<'a, S>(input: &mut S) -> StdParseResult<TypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    token('[')
        .with(parser(type_signature))
        .map(|element| TypeSignature::Array(Box::new(element)))
        .parse_stream(input)
        .into()
}

fn type_variable_signature<'a, S>(input: &mut S) -> StdParseResult<TypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    (token('T'), parser(identifier), token(';'))
        .map(|(_, name, _)| TypeSignature::TypeVariable(name))
        .parse_stream(input)
        .into()
}

fn class_type_signature<'a, S>(input: &mut S) -> StdParseResult<ClassTypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    (
        token('L'),
        sep_by1::<Vec<String>, _, _, _>(parser(identifier), token('/')),
        optional(parser(type_arguments)),
        many::<Vec<SimpleClassTypeSignature>, _, _>(
            token('.').with(parser(simple_class_type_signature)),
        ),
        token(';'),
    )
        .map(|(_, mut path, arguments, suffixes, _)| {
            // sep_by1 yields at least one identifier; the last one is the class
            let name = path.pop().unwrap_or_default();
            let mut segments = vec![SimpleClassTypeSignature {
                name,
                arguments: arguments.unwrap_or_default(),
            }];
            segments.extend(suffixes);
            ClassTypeSignature {
                package: path,
                segments,
            }
        })
        .parse_stream(input)
        .into()
}

fn simple_class_type_signature<'a, S>(input: &mut S) -> StdParseResult<SimpleClassTypeSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    (parser(identifier), optional(parser(type_arguments)))
        .map(|(name, arguments)| SimpleClassTypeSignature {
            name,
            arguments: arguments.unwrap_or_default(),
        })
        .parse_stream(input)
        .into()
}

fn type_arguments<'a, S>(input: &mut S) -> StdParseResult<Vec<TypeArgument>, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    between(
        token('<'),
        token('>'),
        many1::<Vec<TypeArgument>, _, _>(parser(type_argument)),
    )
    .parse_stream(input)
    .into()
}

fn type_argument<'a, S>(input: &mut S) -> StdParseResult<TypeArgument, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    token('*')
        .map(|_| TypeArgument::Any)
        .or(token('+')
            .with(parser(field_type_signature))
            .map(TypeArgument::Extends))
        .or(token('-')
            .with(parser(field_type_signature))
            .map(TypeArgument::Super))
        .or(parser(field_type_signature).map(TypeArgument::Exact))
        .parse_stream(input)
        .into()
}

fn formal_type_parameter<'a, S>(input: &mut S) -> StdParseResult<FormalTypeParameter, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    (
        parser(identifier),
        token(':'),
        optional(parser(field_type_signature)),
        many::<Vec<TypeSignature>, _, _>(token(':').with(parser(field_type_signature))),
    )
        .map(
            |(name, _, class_bound, interface_bounds)| FormalTypeParameter {
                name,
                class_bound,
                interface_bounds,
            },
        )
        .parse_stream(input)
        .into()
}

fn formal_type_parameters<'a, S>(input: &mut S) -> StdParseResult<Vec<FormalTypeParameter>, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    between(
        token('<'),
        token('>'),
        many1::<Vec<FormalTypeParameter>, _, _>(parser(formal_type_parameter)),
    )
    .parse_stream(input)
    .into()
}

fn class_signature<'a, S>(input: &mut S) -> StdParseResult<ClassSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    (
        optional(parser(formal_type_parameters)),
        parser(class_type_signature),
        many::<Vec<ClassTypeSignature>, _, _>(parser(class_type_signature)),
    )
        .map(|(type_parameters, superclass, interfaces)| ClassSignature {
            type_parameters: type_parameters.unwrap_or_default(),
            superclass,
            interfaces,
        })
        .parse_stream(input)
        .into()
}

fn method_signature<'a, S>(input: &mut S) -> StdParseResult<MethodSignature, S>
where
    S: RangeStream<Token = char, Range = &'a str>,
    S::Error: ParseError<char, &'a str, S::Position>,
{
    (
        optional(parser(formal_type_parameters)),
        between(
            token('('),
            token(')'),
            many::<Vec<TypeSignature>, _, _>(parser(type_signature)),
        ),
        parser(return_type),
        many::<Vec<TypeSignature>, _, _>(token('^').with(parser(field_type_signature))),
    )
        .map(
            |(type_parameters, parameters, return_type, throws)| MethodSignature {
                type_parameters: type_parameters.unwrap_or_default(),
                parameters,
                return_type,
                throws,
            },
        )
        .parse_stream(input)
        .into()
}
