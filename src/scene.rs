//! The office roster and character spawn factories. Pure declarative data;
//! mesh and material construction belongs to the host view (see the demo).

use bevy::prelude::*;

use crate::agent::{Agent, AgentKind, AgentProfile, GuideRing, SwingArm};

/// Everything needed to place one character: role-play profile, home anchor
/// and cosmetic colors for the host view.
#[derive(Debug, Clone)]
pub struct CharacterSpec {
    pub profile: AgentProfile,
    pub home: Vec3,
    pub shirt: Color,
    pub hair: Color,
}

/// The MyopicMetaverse office staff: three human coworkers and the guide bot.
pub fn office_roster() -> Vec<CharacterSpec> {
    vec![
        CharacterSpec {
            profile: AgentProfile::human(
                "Finn the Human",
                "CEO",
                "visionary and charismatic",
                "gestures enthusiastically when talking about the metaverse",
                "chestnut",
            ),
            home: Vec3::new(-10.0, 0.0, -5.0),
            shirt: Color::srgb_u8(0xe6, 0x00, 0x00),
            hair: Color::srgb_u8(0x4a, 0x2d, 0x1b),
        },
        CharacterSpec {
            profile: AgentProfile::human(
                "Gary Xia",
                "AI Engineer",
                "technical and precise",
                "explains everything in terms of gas fees and smart contracts",
                "black",
            ),
            home: Vec3::new(10.0, 0.0, -5.0),
            shirt: Color::srgb_u8(0x1a, 0x1a, 0x1a),
            hair: Color::srgb_u8(0x00, 0x00, 0x00),
        },
        CharacterSpec {
            profile: AgentProfile::human(
                "Jake the Dog",
                "Biz Dev Associate",
                "energetic and people-focused",
                "sees every feature as a new way to connect people",
                "walnut",
            ),
            home: Vec3::new(-10.0, 0.0, 5.0),
            shirt: Color::srgb_u8(0x00, 0x55, 0xb3),
            hair: Color::srgb_u8(0x59, 0x45, 0x37),
        },
        CharacterSpec {
            profile: AgentProfile::guide("Guide Bot", "AI Assistant"),
            home: Vec3::new(0.0, 1.5, 10.0),
            shirt: Color::srgb_u8(0x00, 0xaa, 0xff),
            hair: Color::WHITE,
        },
    ]
}

/// Spawn one character entity at its home position, with arm children for
/// humans or ring children for the guide.
pub fn spawn_character(commands: &mut Commands, spec: &CharacterSpec) -> Entity {
    let entity = commands
        .spawn((
            Agent::new(spec.profile.clone(), spec.home),
            Transform::from_translation(spec.home),
        ))
        .id();

    match spec.profile.kind {
        AgentKind::Human => {
            commands.entity(entity).with_children(|parent| {
                parent.spawn((
                    SwingArm {
                        agent: entity,
                        side: 1.0,
                    },
                    Transform::from_xyz(-0.3, 0.7, 0.0),
                ));
                parent.spawn((
                    SwingArm {
                        agent: entity,
                        side: -1.0,
                    },
                    Transform::from_xyz(0.3, 0.7, 0.0),
                ));
            });
        }
        AgentKind::Guide => {
            commands.entity(entity).with_children(|parent| {
                parent.spawn((GuideRing { axis: Dir3::Z }, Transform::default()));
                parent.spawn((GuideRing { axis: Dir3::X }, Transform::default()));
            });
        }
    }

    entity
}

/// Spawn the whole roster; returns the agent entities in roster order.
pub fn spawn_roster(commands: &mut Commands) -> Vec<Entity> {
    office_roster()
        .iter()
        .map(|spec| spawn_character(commands, spec))
        .collect()
}
