use std::env;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Parses the named environment variable, panicking if it's missing or malformed.
pub fn parse_variable<T: FromStr>(name: &str) -> T {
    parse(name, &get_variable(name))
}

/// Parses the named environment variable if it's defined, panicking if
/// it's malformed.
pub fn parse_optional_variable<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().map(|value| parse(name, &value))
}

fn parse<T: FromStr>(name: &str, value: &str) -> T {
    value
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("parse {} as {}", name, std::any::type_name::<T>()))
}
