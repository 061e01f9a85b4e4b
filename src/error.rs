/// Turns a `Result` into an `Option`, logging the error.
///
/// Used by background tasks that retry on their next cycle instead of
/// propagating failures.
pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_log() {
        let ok: Result<u8, std::io::Error> = Ok(3);
        assert_eq!(ok.ok_log(), Some(3));

        let err: Result<u8, std::io::Error> = Err(std::io::ErrorKind::NotFound.into());
        assert_eq!(err.ok_log(), None);
    }
}
