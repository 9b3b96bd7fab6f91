use percent_encoding::{utf8_percent_encode, AsciiSet};

// https://tools.ietf.org/html/rfc5849#section-3.6
// * ALPHA, DIGIT, '-', '.', '_', '~' MUST NOT be encoded.
// * All other characters MUST be encoded.
// * The two hexadecimal characters used to represent encoded
//   characters MUST be uppercase.
const TARGETS_FOR_PARAMS: &AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Values accepted by the RFC 3986 encoder.
///
/// Encoding is total: strings and scalars are encoded through their textual
/// form, lists are encoded element-wise, and an absent value (`None`) encodes
/// to the empty string. Nothing here ever fails.
pub trait PercentEncode {
    type Output;

    fn percent_encode(&self) -> Self::Output;
}

/// Encodes a single string.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, TARGETS_FOR_PARAMS).to_string()
}

/// Encodes every element of `inputs`, preserving order.
pub fn percent_encode_all<I, T>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|s| percent_encode(s.as_ref()))
        .collect()
}

impl PercentEncode for str {
    type Output = String;

    fn percent_encode(&self) -> String {
        percent_encode(self)
    }
}

impl PercentEncode for String {
    type Output = String;

    fn percent_encode(&self) -> String {
        percent_encode(self)
    }
}

impl<T: PercentEncode + ?Sized> PercentEncode for &T {
    type Output = T::Output;

    fn percent_encode(&self) -> T::Output {
        (**self).percent_encode()
    }
}

impl<T> PercentEncode for Option<T>
where
    T: PercentEncode<Output = String>,
{
    type Output = String;

    fn percent_encode(&self) -> String {
        match self {
            Some(v) => v.percent_encode(),
            None => String::new(),
        }
    }
}

impl<T> PercentEncode for [T]
where
    T: PercentEncode<Output = String>,
{
    type Output = Vec<String>;

    fn percent_encode(&self) -> Vec<String> {
        self.iter().map(PercentEncode::percent_encode).collect()
    }
}

impl<T> PercentEncode for Vec<T>
where
    T: PercentEncode<Output = String>,
{
    type Output = Vec<String>;

    fn percent_encode(&self) -> Vec<String> {
        self.as_slice().percent_encode()
    }
}

macro_rules! scalar_percent_encode {
    ($($t:ty),*) => {
        $(
            impl PercentEncode for $t {
                type Output = String;

                fn percent_encode(&self) -> String {
                    percent_encode(&self.to_string())
                }
            }
        )*
    };
}

scalar_percent_encode!(bool, char, i32, i64, u32, u64, usize);
