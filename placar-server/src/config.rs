use placar_core::PlacarConfig;

/// Defaults, then the process environment on top.
pub fn load() -> PlacarConfig {
    let mut config = PlacarConfig::new();
    config.load_env();
    apply_defaults(&mut config);
    config
}

/// Fill in every key that has a sensible default. Existing values are kept.
pub fn apply_defaults(config: &mut PlacarConfig) {
    configure_http(config);
    configure_storage(config);
    configure_legacy(config);
    configure_records(config);
}

fn configure_http(config: &mut PlacarConfig) {
    config.set_default("http.host", "127.0.0.1");
    config.set_default("http.port", "3030");
}

/// Bucket layout. Bucket name, region and keys have no default here: without
/// them diagnostics report what is missing. The region falls back to
/// `us-east-1` where it is read.
fn configure_storage(config: &mut PlacarConfig) {
    config.set_default("s3.prefix.banner", "banners_dupla/");
    config.set_default("s3.prefix.item", "itens/");
}

fn configure_legacy(config: &mut PlacarConfig) {
    config.set_default("legacy.branch", "main");
}

fn configure_records(config: &mut PlacarConfig) {
    config.set_default("records.backend", "firestore");
    config.set_default("firestore.base_url", "https://firestore.googleapis.com/v1");
    config.set_default("firestore.collection.teams", "duplas");
    config.set_default("firestore.collection.items", "itens");
    config.set_default("firestore.field.banner", "banner");
    config.set_default("firestore.field.image", "imagem");
    config.set_default("firestore.field.label", "nome");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_never_override() {
        let mut config = PlacarConfig::new();
        config.set("http.port", "8080");
        config.set("records.backend", "memory");

        apply_defaults(&mut config);

        assert_eq!(config.get("http.port"), Some("8080"));
        assert_eq!(config.get("http.host"), Some("127.0.0.1"));
        assert_eq!(config.get("records.backend"), Some("memory"));
        assert_eq!(config.get("firestore.collection.teams"), Some("duplas"));
        assert!(!config.has("s3.bucket"));
        assert!(!config.has("s3.region"));
    }
}
