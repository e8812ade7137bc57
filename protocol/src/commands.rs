use serde::Deserialize;
use serde::Serialize;

/// A chat command registered by the host application.
///
/// Selecting a command annotates the next outgoing message; the command
/// itself is executed by the host, not by the UI. The registry is an
/// ordered, read-only snapshot: the UI never mutates it, it only asks the
/// controller to change the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Unique name; also the token the user types after `/`.
    pub id: String,
    /// User-visible description shown next to the id in menus.
    pub description: String,
    /// Icon reference. May be empty, in which case menus render the row
    /// without a glyph.
    #[serde(default)]
    pub icon: String,
    /// Always rendered as a chip in the command button row.
    #[serde(default)]
    pub button: bool,
    /// The selection survives sending a message.
    #[serde(default)]
    pub persistent: bool,
}

/// Registry snapshot as loaded from host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRegistry {
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_parses_with_flag_defaults() {
        let registry: CommandRegistry = toml::from_str(
            r#"
            [[commands]]
            id = "Picture"
            description = "Use DALL-E"
            icon = "image"

            [[commands]]
            id = "Search"
            description = "Find on the web"
            icon = "globe"
            button = true
            persistent = true
            "#,
        )
        .unwrap();

        assert_eq!(registry.commands.len(), 2);
        let picture = &registry.commands[0];
        assert!(!picture.button);
        assert!(!picture.persistent);
        let search = &registry.commands[1];
        assert!(search.button);
        assert!(search.persistent);
    }

    #[test]
    fn empty_registry_parses_to_no_commands() {
        let registry: CommandRegistry = toml::from_str("").unwrap();
        assert_eq!(registry, CommandRegistry::default());
    }

    #[test]
    fn icon_is_optional() {
        let registry: CommandRegistry = toml::from_str(
            r#"
            [[commands]]
            id = "Canvas"
            description = "Collaborate on writing and code"
            "#,
        )
        .unwrap();
        assert_eq!(registry.commands[0].icon, "");
    }
}
