/// Individual taxpayer number, the bureau's subscriber identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Itn(String);

impl Itn {
    pub fn parse(s: String) -> Result<Itn, ItnError> {
        let ten_ascii_digits = s.len() == 10 && s.chars().all(|c| c.is_ascii_digit());
        if ten_ascii_digits {
            Ok(Self(s))
        } else {
            Err(ItnError(s))
        }
    }
}

impl AsRef<str> for Itn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Itn {
    type Error = ItnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Itn::parse(value)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{0} is not a valid taxpayer number")]
pub struct ItnError(String);
