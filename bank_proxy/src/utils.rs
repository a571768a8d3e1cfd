//! Address helpers.
use http::Uri;

use crate::error::GrpcError;

/// Normalizes a gRPC address into something tonic can dial. Bare `host:port` pairs and
/// `tcp://` addresses become plaintext `http://` URIs.
pub fn parse_or_build_grpc_endpoint(input: &str) -> Result<String, GrpcError> {
    let uri = input
        .parse::<Uri>()
        .map_err(|err| GrpcError::InvalidEndpoint(format!("{}: {}", input, err)))?;

    let authority = match uri.authority() {
        Some(a) => a.clone(),
        None => {
            return Err(GrpcError::InvalidEndpoint(format!(
                "{} has no host",
                input
            )))
        }
    };

    match uri.scheme_str() {
        Some("http") | Some("https") => Ok(uri.to_string()),
        Some("tcp") | None => {
            // without a scheme we can't infer a default port
            if authority.port().is_none() {
                return Err(GrpcError::InvalidEndpoint(format!(
                    "{} has no port",
                    input
                )));
            }

            let uri = Uri::builder()
                .scheme("http")
                .authority(authority.as_str())
                .path_and_query("/")
                .build()
                .map_err(|err| GrpcError::InvalidEndpoint(format!("{}: {}", input, err)))?;

            Ok(uri.to_string())
        }
        Some(other) => Err(GrpcError::InvalidEndpoint(format!(
            "unsupported scheme {} in {}",
            other, input
        ))),
    }
}
