// src/services/tokens.rs
//
// Tokens assinados com HMAC-SHA256. Dois usos:
//  - o link de aprovação que vai no e-mail interno (assina o id do lead);
//  - a sessão do portal do cliente (assina o e-mail do cliente).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

fn sign(secret: &str, message: &str) -> String {
    // new_from_slice aceita chave de qualquer tamanho; não há como falhar.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC aceita chave de qualquer tamanho");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn verify(secret: &str, message: &str, token: &str) -> bool {
    let Ok(raw) = hex::decode(token) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC aceita chave de qualquer tamanho");
    mac.update(message.as_bytes());
    // verify_slice compara em tempo constante
    mac.verify_slice(&raw).is_ok()
}

pub fn generate_approve_token(secret: &str, lead_id: Uuid) -> String {
    sign(secret, &lead_id.to_string())
}

pub fn verify_approve_token(secret: &str, lead_id: Uuid, token: &str) -> bool {
    verify(secret, &lead_id.to_string(), token)
}

// A sessão do portal é "email.assinatura". O e-mail pode conter pontos,
// mas a assinatura é hex puro, então o split pelo último '.' é seguro.
pub fn generate_portal_session(secret: &str, client_email: &str) -> String {
    let email = client_email.trim().to_lowercase();
    let signature = sign(secret, &format!("portal:{email}"));
    format!("{email}.{signature}")
}

pub fn verify_portal_session(secret: &str, session: &str) -> Option<String> {
    let (email, signature) = session.rsplit_once('.')?;
    if verify(secret, &format!("portal:{email}"), signature) {
        Some(email.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn token_de_aprovacao_valida_e_rejeita_adulteracao() {
        let id = Uuid::new_v4();
        let token = generate_approve_token(SECRET, id);
        assert!(verify_approve_token(SECRET, id, &token));

        // token adulterado
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_approve_token(SECRET, id, &tampered));

        // token de outro lead
        assert!(!verify_approve_token(SECRET, Uuid::new_v4(), &token));

        // lixo que nem é hex
        assert!(!verify_approve_token(SECRET, id, "nao-e-hex"));
    }

    #[test]
    fn sessao_do_portal_carrega_o_email() {
        let session = generate_portal_session(SECRET, " Client@Acme.com ");
        assert_eq!(
            verify_portal_session(SECRET, &session).as_deref(),
            Some("client@acme.com")
        );
        assert!(verify_portal_session("outro-segredo", &session).is_none());
        assert!(verify_portal_session(SECRET, "sem-assinatura").is_none());
    }
}
