use banter_protocol::commands::Command;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use super::popup_consts::TOOLS_TRIGGER_ID;
use super::selection_popup_common::accent_style;
use super::tools_popup::trigger_visible;

/// One chip in the command button row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandChip {
    pub command: Command,
    /// Chip represents the current selection (accent styling).
    pub selected: bool,
    /// Clicking the chip clears the selection instead of setting it.
    pub removable: bool,
}

impl CommandChip {
    /// Identity string exposed for integration tests: `command-<id>`.
    pub fn identity(&self) -> String {
        format!("command-{}", self.command.id)
    }
}

/// Chips to render for the current registry and selection, in order:
/// the selected non-button command first (as a removable chip), then
/// every button-flagged command. Empty when there is nothing to show.
pub(crate) fn chip_row(commands: &[Command], selected_id: Option<&str>) -> Vec<CommandChip> {
    let mut chips = Vec::new();
    if let Some(selected) = selected_id
        && let Some(command) = commands
            .iter()
            .find(|c| c.id == selected && !c.button)
    {
        chips.push(CommandChip {
            command: command.clone(),
            selected: true,
            removable: true,
        });
    }
    for command in commands.iter().filter(|c| c.button) {
        let selected = selected_id == Some(command.id.as_str());
        chips.push(CommandChip {
            command: command.clone(),
            selected,
            removable: selected,
        });
    }
    chips
}

/// What a pointer click in the chip row lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChipTarget {
    /// The Tools trigger ("command-button").
    ToolsTrigger,
    /// A command chip, by command id.
    Chip(String),
}

impl ChipTarget {
    /// Identity string for tests: `command-button` for the trigger,
    /// `command-<id>` for chips.
    pub(crate) fn identity(&self) -> String {
        match self {
            ChipTarget::ToolsTrigger => TOOLS_TRIGGER_ID.to_string(),
            ChipTarget::Chip(id) => format!("command-{id}"),
        }
    }
}

struct ChipSegment {
    label: String,
    target: ChipTarget,
    accent: bool,
}

fn segments(commands: &[Command], selected_id: Option<&str>) -> Vec<ChipSegment> {
    let mut out = Vec::new();
    if trigger_visible(commands) {
        out.push(ChipSegment {
            label: "[ Tools ]".to_string(),
            target: ChipTarget::ToolsTrigger,
            accent: false,
        });
    }
    for chip in chip_row(commands, selected_id) {
        let icon = if chip.command.icon.is_empty() {
            String::new()
        } else {
            format!("{} ", chip.command.icon)
        };
        let close = if chip.removable { " ✕" } else { "" };
        out.push(ChipSegment {
            label: format!("[ {icon}{}{close} ]", chip.command.id),
            target: ChipTarget::Chip(chip.command.id),
            accent: chip.selected,
        });
    }
    out
}

/// Whether the row would render anything at all for this state.
pub(crate) fn has_content(commands: &[Command], selected_id: Option<&str>) -> bool {
    trigger_visible(commands) || !chip_row(commands, selected_id).is_empty()
}

/// Render the chip row on a single line: the Tools trigger (when any
/// non-button command exists) followed by the chips.
pub(crate) fn render_chip_row(
    area: Rect,
    buf: &mut Buffer,
    commands: &[Command],
    selected_id: Option<&str>,
    tools_open: bool,
) {
    if area.height == 0 {
        return;
    }
    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, segment) in segments(commands, selected_id).into_iter().enumerate() {
        if i > 0 {
            spans.push(" ".into());
        }
        let style = if segment.accent {
            accent_style()
        } else if segment.target == ChipTarget::ToolsTrigger && tools_open {
            Style::default().bold()
        } else {
            Style::default()
        };
        spans.push(Span::styled(segment.label, style));
    }
    Line::from(spans).render(area, buf);
}

/// Map a pointer position on the chip line to the segment under it.
pub(crate) fn hit_test(
    area: Rect,
    commands: &[Command],
    selected_id: Option<&str>,
    x: u16,
    y: u16,
) -> Option<ChipTarget> {
    if y != area.y || x < area.x {
        return None;
    }
    let mut cursor = area.x;
    for (i, segment) in segments(commands, selected_id).into_iter().enumerate() {
        if i > 0 {
            cursor += 1;
        }
        let width = UnicodeWidthStr::width(segment.label.as_str()) as u16;
        if x >= cursor && x < cursor + width {
            return Some(segment.target);
        }
        cursor += width;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn command(id: &str, button: bool) -> Command {
        Command {
            id: id.to_string(),
            description: format!("run {id}"),
            icon: String::new(),
            button,
            persistent: false,
        }
    }

    fn registry() -> Vec<Command> {
        vec![
            command("Search", true),
            command("Picture", false),
            command("Canvas", false),
        ]
    }

    #[test]
    fn button_commands_always_render_as_chips() {
        let chips = chip_row(&registry(), None);
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].identity(), "command-Search");
        assert!(!chips[0].selected);
    }

    #[test]
    fn selected_non_button_command_renders_first_and_removable() {
        let chips = chip_row(&registry(), Some("Picture"));
        let identities: Vec<String> = chips.iter().map(CommandChip::identity).collect();
        assert_eq!(identities, vec!["command-Picture", "command-Search"]);
        assert!(chips[0].selected);
        assert!(chips[0].removable);
        assert!(!chips[1].selected);
    }

    #[test]
    fn selected_button_command_gets_accent_not_an_extra_chip() {
        let chips = chip_row(&registry(), Some("Search"));
        assert_eq!(chips.len(), 1);
        assert!(chips[0].selected);
        assert!(chips[0].removable);
    }

    #[test]
    fn nothing_to_render_without_buttons_or_selection() {
        let commands = vec![command("Picture", false)];
        assert!(chip_row(&commands, None).is_empty());
        // The Tools trigger still shows: Picture is reachable through it.
        assert!(has_content(&commands, None));
    }

    #[test]
    fn empty_registry_renders_nothing() {
        assert!(!has_content(&[], None));
    }

    #[test]
    fn hit_test_resolves_trigger_and_chips() {
        let commands = registry();
        let area = Rect::new(0, 3, 60, 1);
        // Segments: "[ Tools ]" (9 cells), gap, "[ Search ]" (10 cells).
        assert_eq!(
            hit_test(area, &commands, None, 0, 3),
            Some(ChipTarget::ToolsTrigger)
        );
        assert_eq!(
            hit_test(area, &commands, None, 8, 3),
            Some(ChipTarget::ToolsTrigger)
        );
        assert_eq!(hit_test(area, &commands, None, 9, 3), None);
        assert_eq!(
            hit_test(area, &commands, None, 10, 3),
            Some(ChipTarget::Chip("Search".to_string()))
        );
        assert_eq!(hit_test(area, &commands, None, 25, 3), None);
        assert_eq!(hit_test(area, &commands, None, 10, 4), None);
    }

    #[test]
    fn targets_expose_identity_strings() {
        let commands = registry();
        let area = Rect::new(0, 0, 60, 1);
        let trigger = hit_test(area, &commands, None, 0, 0).expect("trigger");
        assert_eq!(trigger.identity(), "command-button");
        let chip = hit_test(area, &commands, None, 10, 0).expect("chip");
        assert_eq!(chip.identity(), "command-Search");
    }

    #[test]
    fn hit_test_covers_the_selected_chip() {
        let commands = registry();
        // "[ Tools ]" + gap + "[ Picture ✕ ]" + gap + "[ Search ]".
        let area = Rect::new(0, 0, 60, 1);
        assert_eq!(
            hit_test(area, &commands, Some("Picture"), 12, 0),
            Some(ChipTarget::Chip("Picture".to_string()))
        );
    }
}
