//! Checks over the status line and headers.

use std::collections::BTreeMap;

use crate::reason::CheckFailure;
use crate::response::ProbeResponse;

/// Status codes from this value up are failures under the default policy.
pub const ERROR_STATUS_THRESHOLD: u16 = 400;

/// A check that only needs the response head.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseCheck {
    /// Status code must be one of the listed codes.
    StatusIn(Vec<u16>),
    /// Status code must be below 400.
    StatusOk,
    /// Every header must have exactly the given value.
    Headers(BTreeMap<String, String>),
}

impl ResponseCheck {
    /// Status check for a configured list; an empty list means [`ResponseCheck::StatusOk`].
    pub fn status(codes: &[u16]) -> Self {
        if codes.is_empty() {
            ResponseCheck::StatusOk
        } else {
            ResponseCheck::StatusIn(codes.to_vec())
        }
    }

    pub fn check<R: ProbeResponse + ?Sized>(&self, response: &R) -> Result<(), CheckFailure> {
        match self {
            ResponseCheck::StatusIn(codes) => {
                let actual = response.status().as_u16();
                if codes.contains(&actual) {
                    Ok(())
                } else {
                    Err(CheckFailure::UnexpectedStatus {
                        actual,
                        expected: codes.clone(),
                    })
                }
            }
            ResponseCheck::StatusOk => {
                if response.status().as_u16() >= ERROR_STATUS_THRESHOLD {
                    Err(CheckFailure::ErrorStatus {
                        status_line: response.status_line(),
                    })
                } else {
                    Ok(())
                }
            }
            ResponseCheck::Headers(expected) => {
                for (name, value) in expected {
                    let actual = response.header(name).unwrap_or_default();
                    if &actual != value {
                        return Err(CheckFailure::HeaderMismatch {
                            name: name.clone(),
                            actual,
                            expected: value.clone(),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Response;

    fn response(status: u16) -> Response<()> {
        Response::builder().status(status).body(()).unwrap()
    }

    fn headers(pairs: &[(&str, &str)]) -> ResponseCheck {
        ResponseCheck::Headers(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_status_in_list() {
        let check = ResponseCheck::status(&[200, 201]);

        assert_eq!(check.check(&response(201)), Ok(()));
        assert_eq!(
            check.check(&response(404)),
            Err(CheckFailure::UnexpectedStatus {
                actual: 404,
                expected: vec![200, 201],
            })
        );
    }

    #[test]
    fn test_status_list_is_exact() {
        let check = ResponseCheck::status(&[200]);
        assert!(check.check(&response(204)).is_err());
        assert!(check.check(&response(500)).is_err());
    }

    #[test]
    fn test_listed_error_status_passes() {
        let check = ResponseCheck::status(&[503]);
        assert_eq!(check.check(&response(503)), Ok(()));
    }

    #[test]
    fn test_default_status_policy() {
        let check = ResponseCheck::status(&[]);
        assert_eq!(check, ResponseCheck::StatusOk);

        assert_eq!(check.check(&response(200)), Ok(()));
        assert_eq!(check.check(&response(301)), Ok(()));
        assert_eq!(check.check(&response(399)), Ok(()));
        assert_eq!(
            check.check(&response(400)),
            Err(CheckFailure::ErrorStatus {
                status_line: "400 Bad Request".to_string(),
            })
        );
        assert_eq!(
            check.check(&response(500)).unwrap_err().to_string(),
            "500 Internal Server Error"
        );
    }

    #[test]
    fn test_headers_match() {
        let check = headers(&[("Content-Type", "application/json")]);
        let ok = Response::builder()
            .header("content-type", "application/json")
            .body(())
            .unwrap();

        assert_eq!(check.check(&ok), Ok(()));
    }

    #[test]
    fn test_header_mismatch() {
        let check = headers(&[("Content-Type", "application/json")]);
        let html = Response::builder()
            .header("Content-Type", "text/html")
            .body(())
            .unwrap();

        assert_eq!(
            check.check(&html),
            Err(CheckFailure::HeaderMismatch {
                name: "Content-Type".to_string(),
                actual: "text/html".to_string(),
                expected: "application/json".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_header_compares_as_empty() {
        let check = headers(&[("X-Version", "2")]);
        let failure = check.check(&response(200)).unwrap_err();
        assert_eq!(failure.to_string(), "header X-Version is '' expecting '2'");

        let expects_empty = headers(&[("X-Empty", "")]);
        assert_eq!(expects_empty.check(&response(200)), Ok(()));
    }

    #[test]
    fn test_first_mismatch_in_name_order_is_reported() {
        let check = headers(&[("B-Header", "b"), ("A-Header", "a")]);
        let failure = check.check(&response(200)).unwrap_err();
        assert!(matches!(
            failure,
            CheckFailure::HeaderMismatch { ref name, .. } if name == "A-Header"
        ));
    }
}
