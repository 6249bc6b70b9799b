use preferred_canonical::{sign, Canonicalizer, FieldMap, ProtocolVariant, Scope, SigningField};

fn main() {
    let canonicalizer = Canonicalizer::new(ProtocolVariant::Current);
    let mut fields = FieldMap::new();
    fields
        .set(
            SigningField::Choices,
            vec!["red".to_string(), "green".to_string(), "blue".to_string()],
        )
        .set(SigningField::Expiration, "1766188800")
        .set(SigningField::Tournament, "example")
        .set(SigningField::Uid, "00000000-0000-4000-8000-000000000000");

    match canonicalizer.canonicalize(&fields, Scope::Full) {
        Ok(canonical) => {
            println!("{}", canonical);
            println!("{}", sign(b"example-secret", &canonical));
        }
        Err(err) => {
            eprintln!("canonicalization failed: {}", err);
            std::process::exit(1);
        }
    }
}
