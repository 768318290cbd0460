//! OpenID Connect ID token verification against the provider's JWKS.

use jsonwebtoken::{decode, decode_header, jwk::JwkSet, DecodingKey, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::discovery::ProviderMetadata;
use crate::error::{id_token_error, Error, IdTokenErrorKind};

/// Verified ID token claims. Every claim the provider sent is preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Verifies signature, issuer, audience, expiry and nonce of `id_token`.
pub(crate) async fn verify(
    http_client: &reqwest::Client,
    metadata: &ProviderMetadata,
    client_id: &str,
    id_token: &str,
    expected_nonce: Option<&str>,
) -> Result<IdTokenClaims, Error> {
    let header = decode_header(id_token)?;

    let jwks: JwkSet = http_client
        .get(&metadata.jwks_uri)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let jwk = match header.kid.as_deref() {
        Some(kid) => jwks.find(kid),
        None => jwks.keys.first(),
    }
    .ok_or_else(|| {
        warn!("No JWK matches ID token key id {:?}", header.kid);
        id_token_error(IdTokenErrorKind::KeyNotFound, "no matching signing key")
    })?;
    let key = DecodingKey::from_jwk(jwk)?;

    let mut validation = Validation::new(header.alg);
    validation.set_audience(&[client_id]);
    validation.set_issuer(&[metadata.issuer.as_str()]);

    let claims = decode::<IdTokenClaims>(id_token, &key, &validation)
        .map_err(|e| {
            warn!("ID token failed validation: {e}");
            Error::from(e)
        })?
        .claims;

    if let Some(expected) = expected_nonce {
        if claims.nonce.as_deref() != Some(expected) {
            warn!("ID token nonce does not match the nonce issued at login");
            return Err(id_token_error(
                IdTokenErrorKind::NonceMismatch,
                "ID token nonce mismatch",
            ));
        }
    }

    debug!("Verified ID token for subject {}", claims.sub);
    Ok(claims)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Signs ID tokens with a symmetric JWK so tests can stand in for a provider.

    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};

    pub const SIGNING_SECRET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJ";
    pub const SIGNING_KID: &str = "test-key";

    pub fn jwks() -> Value {
        json!({
            "keys": [{
                "kty": "oct",
                "kid": SIGNING_KID,
                "alg": "HS256",
                "k": "YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXpBQkNERUZHSElK"
            }]
        })
    }

    pub fn sign(claims: &Value) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(SIGNING_KID.to_string());
        encode(&header, claims, &EncodingKey::from_secret(SIGNING_SECRET)).unwrap()
    }

    pub fn claims(issuer: &str, audience: &str, nonce: Option<&str>) -> Value {
        let now = chrono::Utc::now().timestamp();
        let mut claims = json!({
            "iss": issuer,
            "aud": audience,
            "sub": "110169484474386276334",
            "email": "ada@example.com",
            "iat": now,
            "exp": now + 3600,
        });
        if let Some(nonce) = nonce {
            claims["nonce"] = json!(nonce);
        }
        claims
    }
}
