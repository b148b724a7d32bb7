//! The MyopicMetaverse virtual office, rendered with Bevy primitives.
//!
//! Run with: `cargo run --example office --release`
//!
//! Controls:
//! - WASD to walk, arrow keys or mouse to look around
//! - E to talk to a nearby coworker, Escape to end the conversation
//! - 1-4 to ask one of the suggested questions
//! - Space to dance
//!
//! Set GEMINI_API_KEY to get generated responses; without it the coworkers
//! answer from their scripted tables.

use bevy::prelude::*;
use myopic_office::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(VirtualOfficePlugin::default())
        .insert_resource(SignIn::guest())
        .add_systems(Startup, setup_world)
        .add_systems(Update, (pick_suggested_question, follow_player, update_hud))
        .run();
}

#[derive(Component)]
struct Hud;

/// Build the office: floor, desks, lighting, the roster and the player.
fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 4.0, -8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        brightness: 250.0,
        ..default()
    });

    // Floor, walls left to the imagination.
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(0x8a, 0x92, 0x9e))),
    ));

    // A few desks to walk around.
    let desk_mesh = meshes.add(Cuboid::new(2.0, 0.8, 1.0));
    let desk_material = materials.add(Color::srgb_u8(0x6b, 0x4f, 0x2e));
    for spot in [
        Vec3::new(-10.0, 0.4, -7.0),
        Vec3::new(10.0, 0.4, -7.0),
        Vec3::new(-10.0, 0.4, 7.0),
        Vec3::new(10.0, 0.4, 7.0),
    ] {
        commands.spawn((
            Mesh3d(desk_mesh.clone()),
            MeshMaterial3d(desk_material.clone()),
            Transform::from_translation(spot),
        ));
    }

    // Roster entities come back in roster order, so zip the specs to dress
    // each character.
    let agents = spawn_roster(&mut commands);
    for (entity, spec) in agents.into_iter().zip(office_roster()) {
        let body = match spec.profile.kind {
            AgentKind::Human => meshes.add(Capsule3d::new(0.4, 1.0)),
            AgentKind::Guide => meshes.add(Sphere::new(0.5)),
        };
        commands.entity(entity).insert((
            Mesh3d(body),
            MeshMaterial3d(materials.add(spec.shirt)),
        ));
    }

    commands.spawn((
        Player::default(),
        Transform::from_xyz(0.0, 0.0, 0.0),
        Mesh3d(meshes.add(Capsule3d::new(0.4, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(0x2e, 0xcc, 0x71))),
    ));

    commands.spawn((
        Hud,
        Text::new("Walk up to a coworker and press E to talk."),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(20.0),
            left: Val::Px(20.0),
            ..default()
        },
    ));

    info!("office ready; walk up to a coworker and press E");
}

/// Digit keys submit one of the currently offered suggested questions.
fn pick_suggested_question(
    keys: Res<ButtonInput<KeyCode>>,
    session: Res<DialogueSession>,
    mut queue: ResMut<QuestionQueue>,
) {
    if !session.is_open() {
        return;
    }
    let picked = if keys.just_pressed(KeyCode::Digit1) {
        session.options.first()
    } else if keys.just_pressed(KeyCode::Digit2) {
        session.options.get(1)
    } else if keys.just_pressed(KeyCode::Digit3) {
        session.options.get(2)
    } else if keys.just_pressed(KeyCode::Digit4) {
        session.options.get(3)
    } else {
        None
    };
    if let Some(question) = picked {
        queue.push(question.clone());
    }
}

/// Third-person chase camera, looking over the player's shoulder.
fn follow_player(
    players: Query<&Transform, With<Player>>,
    mut cameras: Query<&mut Transform, (With<Camera3d>, Without<Player>)>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    let Ok(mut camera) = cameras.single_mut() else {
        return;
    };
    let behind = player.translation - *player.forward() * 8.0 + Vec3::Y * 4.0;
    camera.translation = behind;
    camera.look_at(player.translation + Vec3::Y * 1.5, Vec3::Y);
}

/// Mirror the interaction hint and the open session into the HUD text.
fn update_hud(
    session: Res<DialogueSession>,
    hint: Res<InteractionHint>,
    mut hud: Query<&mut Text, With<Hud>>,
) {
    let Ok(mut text) = hud.single_mut() else {
        return;
    };

    if session.is_open() {
        let mut lines = vec![session.title.clone(), String::new()];
        for line in &session.transcript {
            lines.push(format!("{}: {}", line.speaker, line.text));
        }
        lines.push(String::new());
        for (index, option) in session.options.iter().enumerate() {
            lines.push(format!("[{}] {}", index + 1, option));
        }
        lines.push("Escape to end the conversation".to_string());
        **text = lines.join("\n");
    } else if let Some(hint) = &hint.0 {
        **text = hint.clone();
    } else {
        **text = "Walk up to a coworker and press E to talk.".to_string();
    }
}
