//! Signature methods and the key material behind them.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rsa::{
	RsaPrivateKey,
	pkcs1::DecodeRsaPrivateKey,
	pkcs1v15,
	pkcs8::DecodePrivateKey,
	signature::{SignatureEncoding, Signer as _},
};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, SigningError},
	signing::encode::percent_encode,
};

/// Signature method advertised in `oauth_signature_method`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// Shared-secret signing for public applications.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// Private-key signing for certificate-based applications.
	#[serde(rename = "RSA-SHA1")]
	RsaSha1,
}
impl SignatureMethod {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::HmacSha1 => "HMAC-SHA1",
			SignatureMethod::RsaSha1 => "RSA-SHA1",
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"HMAC-SHA1" => Ok(Self::HmacSha1),
			"RSA-SHA1" => Ok(Self::RsaSha1),
			_ => Err(ConfigError::UnsupportedSignatureMethod { method: s.to_owned() }),
		}
	}
}

/// Prepared key material; RSA keys are parsed once at construction.
pub(crate) enum SigningKey {
	Hmac { consumer_secret: String },
	Rsa(Box<pkcs1v15::SigningKey<Sha1>>),
}
impl SigningKey {
	/// Prepares the key for `method` from the consumer secret.
	///
	/// For RSA-SHA1 the consumer secret is the PEM private key (PKCS#8 or PKCS#1).
	pub(crate) fn from_method(
		method: SignatureMethod,
		consumer_secret: &str,
	) -> Result<Self, ConfigError> {
		match method {
			SignatureMethod::HmacSha1 =>
				Ok(Self::Hmac { consumer_secret: consumer_secret.to_owned() }),
			SignatureMethod::RsaSha1 => {
				let key = parse_private_key(consumer_secret)?;

				Ok(Self::Rsa(Box::new(pkcs1v15::SigningKey::<Sha1>::new(key))))
			},
		}
	}

	/// Signs the base string and returns the base64 signature.
	pub(crate) fn sign(&self, base_string: &str, token_secret: &str) -> Result<String, SigningError> {
		match self {
			SigningKey::Hmac { consumer_secret } => {
				let key = format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret));
				let mut mac =
					<Hmac<Sha1>>::new_from_slice(key.as_bytes()).map_err(|_| SigningError::Hmac)?;

				mac.update(base_string.as_bytes());

				Ok(STANDARD.encode(mac.finalize().into_bytes()))
			},
			SigningKey::Rsa(key) => {
				let signature = key
					.try_sign(base_string.as_bytes())
					.map_err(|e| SigningError::Rsa { source: e.to_string().into() })?;

				Ok(STANDARD.encode(signature.to_bytes()))
			},
		}
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			SigningKey::Hmac { .. } => f.write_str("SigningKey::Hmac(<redacted>)"),
			SigningKey::Rsa(_) => f.write_str("SigningKey::Rsa(<redacted>)"),
		}
	}
}

pub(crate) fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, ConfigError> {
	let pem = pem.trim();

	RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8_err| {
		RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| ConfigError::InvalidPrivateKey {
			source: format!("PKCS#8: {pkcs8_err}; PKCS#1: {pkcs1_err}").into(),
		})
	})
}
