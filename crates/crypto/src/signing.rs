//! # 署名素材の生成
//!
//! リクエストごとに新しいP-256鍵ペアを生成し、以下を返す:
//! 1. 公開鍵（SubjectPublicKeyInfo DER → Base64）
//! 2. 固定アイデンティティ文字列へのProof of Possession署名
//! 3. アーティファクトダイジェストへの署名
//!
//! 秘密鍵はこの関数の外に出ない。返却されるのは公開鍵と署名のみ。

use base64::Engine;
use ecdsa::signature::hazmat::RandomizedPrehashSigner;
use ecdsa::signature::RandomizedSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::zeroize::Zeroize;
use p256::pkcs8::EncodePublicKey;
use rand::rngs::OsRng;
use rand::RngCore;
use tas_types::{CryptoComponents, IDENTITY_TO_SIGN};

use crate::{b64, ArtifactDigest, CancelSignal, CryptoError};

/// 署名素材一式を生成する。
///
/// 途中のどのステップが失敗しても部分的な結果は返さない。
/// キャンセルはアイデンティティ署名の前後で確認する。
pub fn generate_components(
    digest: &ArtifactDigest,
    cancel: &CancelSignal,
) -> Result<CryptoComponents, CryptoError> {
    let signing_key = generate_signing_key()?;
    let public_key_der = encode_public_key(signing_key.verifying_key())?;

    let proof_of_possession = sign_identity(&signing_key, IDENTITY_TO_SIGN.as_bytes(), cancel)?;
    let artifact_signature = sign_artifact_digest(&signing_key, digest)?;

    Ok(CryptoComponents {
        public_key_base64: b64().encode(public_key_der),
        signed_email_address: b64().encode(proof_of_possession),
        artifact_hash: digest.to_hex(),
        artifact_signature: b64().encode(artifact_signature),
    })
}

/// 鍵スカラーの棄却サンプリングの上限回数
///
/// 一様乱数が群位数以上になる確率は約2^-32のため、正常な乱数源で
/// 上限に達することはない。
const MAX_KEY_ATTEMPTS: usize = 64;

/// OS乱数源からスカラーを読み出してP-256署名鍵を生成する。
fn generate_signing_key() -> Result<SigningKey, CryptoError> {
    signing_key_from_rng(&mut OsRng)
}

/// 乱数源から有効なスカラー（1 ≤ d < n）が得られるまで引き直して鍵を生成する。
///
/// 失敗するのは乱数源の読み出しエラーか、上限回数まで無効値が続いた場合のみ。
fn signing_key_from_rng<R: RngCore>(rng: &mut R) -> Result<SigningKey, CryptoError> {
    let mut secret = p256::FieldBytes::default();
    for _ in 0..MAX_KEY_ATTEMPTS {
        if let Err(e) = rng.try_fill_bytes(secret.as_mut_slice()) {
            secret.as_mut_slice().zeroize();
            return Err(CryptoError::KeyGeneration(e.to_string()));
        }

        let candidate = SigningKey::from_bytes(&secret);
        secret.as_mut_slice().zeroize();
        if let Ok(signing_key) = candidate {
            return Ok(signing_key);
        }
    }

    Err(CryptoError::KeyGeneration(format!(
        "{MAX_KEY_ATTEMPTS}回引き直しても有効なスカラーが得られません"
    )))
}

/// 公開鍵をPKIX (SubjectPublicKeyInfo) DERにエンコードする。
fn encode_public_key(verifying_key: &VerifyingKey) -> Result<Vec<u8>, CryptoError> {
    let document = verifying_key
        .to_public_key_der()
        .map_err(|e| CryptoError::PublicKeyEncoding(e.to_string()))?;
    Ok(document.as_bytes().to_vec())
}

/// メッセージをSHA-256でハッシュしてECDSA署名する（ASN.1 DER）。
fn sign_identity(
    signing_key: &SigningKey,
    message: &[u8],
    cancel: &CancelSignal,
) -> Result<Vec<u8>, CryptoError> {
    if cancel.is_cancelled() {
        return Err(CryptoError::Cancelled);
    }

    let signature: Signature = signing_key
        .try_sign_with_rng(&mut OsRng, message)
        .map_err(|e| CryptoError::IdentitySigning(e.to_string()))?;

    if cancel.is_cancelled() {
        return Err(CryptoError::Cancelled);
    }
    Ok(signature.to_der().as_bytes().to_vec())
}

/// ダイジェストを再ハッシュせずそのまま署名する（ASN.1 DER）。
///
/// nonceは署名ごとにOS乱数源から導出する。
fn sign_artifact_digest(
    signing_key: &SigningKey,
    digest: &ArtifactDigest,
) -> Result<Vec<u8>, CryptoError> {
    let signature: Signature = signing_key
        .sign_prehash_with_rng(&mut OsRng, digest.as_bytes())
        .map_err(|e| CryptoError::ArtifactSigning(e.to_string()))?;
    Ok(signature.to_der().as_bytes().to_vec())
}
