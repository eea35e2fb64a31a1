//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Adapter for `#[graphql(with = ..)]` attribute, exposing a newtype over a
/// validated domain value `As` as a GraphQL string scalar.
///
/// Output is rendered with the [`Display`] impl of `As`, and input is parsed
/// with its [`FromStr`] impl, so the domain validation (trimming,
/// title-casing, length limits) applies to every GraphQL argument.
///
/// The newtype must implement [`AsRef`] and [`TryFrom`] for `As`.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Renders the provided `value` as a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Parses the provided string scalar `input` into the target type.
    ///
    /// # Errors
    ///
    /// If the `input` is not a string, or it's rejected by the [`FromStr`]
    /// impl of `As`, or by the [`TryFrom`] impl of the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("<unnamed>");

        let raw = input.as_string_value().ok_or_else(|| {
            format!("`{name}` scalar expects a string value, got: {input}")
        })?;
        let value = raw.parse::<As>().map_err(|e| {
            format!("`{name}` scalar cannot be parsed from \"{raw}\": {e}")
        })?;
        T::try_from(value).map_err(|e| format!("`{name}` scalar: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a [`String`].
    ///
    /// # Errors
    ///
    /// If the token is not a string literal.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}
