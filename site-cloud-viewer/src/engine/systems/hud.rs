use bevy::prelude::*;

use crate::engine::core::app_state::FpsText;
use crate::session::state::CalibrationScale;
use crate::tools::interaction::PointerInteraction;
use crate::tools::tool_manager::{ToolManager, ToolType};

#[derive(Component)]
pub struct CoordinateText;

#[derive(Component)]
pub struct MeasurePromptText;

#[derive(Component)]
pub struct ScaleText;

const HUD_FONT_SIZE: f32 = 14.0;
const HUD_TEXT_COLOUR: Color = Color::srgb(0.58, 0.64, 0.72);

pub fn coordinate_text(hover: Option<Vec3>) -> String {
    match hover {
        Some(p) => format!("LIVE_COORD: {:.2}, {:.2}, {:.2}", p.x, p.y, p.z),
        None => "SCANNING_ENVIRONMENT...".to_string(),
    }
}

/// Prompt for the measure tool, `None` when it is not active.
pub fn measure_prompt(measuring: bool, pending: Option<Vec3>) -> Option<&'static str> {
    if !measuring {
        return None;
    }
    Some(match pending {
        Some(_) => "Click the measurement end point",
        None => "Click the measurement start point",
    })
}

pub fn scale_text(scale: CalibrationScale) -> String {
    format!("SCALE: 1:{:.0}", scale.ratio_denominator())
}

fn hud_text(text: impl Into<String>) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size: HUD_FONT_SIZE,
            ..default()
        },
        TextColor(HUD_TEXT_COLOUR),
    )
}

pub fn spawn_hud(mut commands: Commands, scale: Res<CalibrationScale>) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                hud_text(scale_text(*scale)),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                ScaleText,
            ));
            parent.spawn((
                hud_text("FPS: "),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(32.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
            parent.spawn((
                hud_text(coordinate_text(None)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                CoordinateText,
            ));
            parent
                .spawn(Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(24.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                })
                .with_children(|row| {
                    row.spawn((hud_text(""), Visibility::Hidden, MeasurePromptText));
                });
        });
}

pub fn update_hud_text(
    interaction: Res<PointerInteraction>,
    tool_manager: Res<ToolManager>,
    scale: Res<CalibrationScale>,
    mut coordinate: Query<&mut Text, (With<CoordinateText>, Without<MeasurePromptText>, Without<ScaleText>)>,
    mut prompt: Query<(&mut Text, &mut Visibility), (With<MeasurePromptText>, Without<ScaleText>)>,
    mut scale_readout: Query<&mut Text, (With<ScaleText>, Without<CoordinateText>)>,
) {
    for mut text in &mut coordinate {
        text.0 = coordinate_text(interaction.hover());
    }

    let measuring = tool_manager.is_tool_active(ToolType::Measure);
    for (mut text, mut visibility) in &mut prompt {
        match measure_prompt(measuring, interaction.pending()) {
            Some(message) => {
                text.0 = message.to_string();
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    if scale.is_changed() {
        for mut text in &mut scale_readout {
            text.0 = scale_text(*scale);
        }
    }
}
