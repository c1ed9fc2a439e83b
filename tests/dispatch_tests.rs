//! SessionAgent dispatch tests

#[cfg(test)]
mod tests {
    use hive_session::{
        dispatch::{OutboundEvent, SessionAgent, SessionAgentConfig, SessionAgentHandles},
        protocol::{
            topics, CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, PlayersSnapshot,
            RoomAck, SessionCommand,
        },
        registry::SessionRegistry,
        spawn::FixedSpawn,
        types::{Direction, Player},
    };
    use std::sync::Arc;
    use tokio::sync::broadcast;

    fn make_agent() -> (SessionAgent, SessionAgentHandles) {
        let registry = Arc::new(SessionRegistry::new(Arc::new(FixedSpawn::new(5.0, 6.0))));
        SessionAgent::new(SessionAgentConfig::default(), registry)
    }

    /// Feed `commands` to a fresh agent, run it to completion, and collect
    /// every event it broadcast.
    fn run_commands(commands: Vec<SessionCommand>) -> Vec<OutboundEvent> {
        tokio_test::block_on(async {
            let (agent, handles) = make_agent();
            let SessionAgentHandles {
                commands: tx,
                outbound,
            } = handles;
            let mut rx = outbound.subscribe();

            for cmd in commands {
                tx.send(cmd).await.expect("agent alive");
            }
            drop(tx); // closes the command channel so run() drains and stops
            agent.run().await;

            let mut events = Vec::new();
            loop {
                match rx.try_recv() {
                    Ok(ev) => events.push(ev),
                    Err(broadcast::error::TryRecvError::Empty)
                    | Err(broadcast::error::TryRecvError::Closed) => break,
                    Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                }
            }
            events
        })
    }

    fn ack(ev: &OutboundEvent) -> RoomAck {
        serde_json::from_slice(&ev.payload).expect("RoomAck payload")
    }

    fn snapshot(ev: &OutboundEvent) -> PlayersSnapshot {
        serde_json::from_slice(&ev.payload).expect("PlayersSnapshot payload")
    }

    // -----------------------------------------------------------------------
    // Full session flow
    // -----------------------------------------------------------------------

    #[test]
    fn create_join_register_move_leave_flow() {
        let mut update = Player::new("p1", "office-1", "alice");
        update.x = 50.0;
        update.y = 75.0;
        update.direction = Direction::Right;
        update.is_moving = true;
        update.animation = "walk".into();
        update.timestamp = 123;

        let events = run_commands(vec![
            SessionCommand::CreateRoom(CreateRoomRequest {
                username: "alice".into(),
                room_id: "office-1".into(),
            }),
            SessionCommand::JoinRoom(JoinRoomRequest {
                username: "alice".into(),
                room_id: "office-1".into(),
            }),
            SessionCommand::Register(Player::new("p1", "office-1", "alice")),
            SessionCommand::Move(update),
            SessionCommand::LeaveRoom(LeaveRoomRequest {
                room_id: "office-1".into(),
                player_id: "p1".into(),
            }),
        ]);

        assert_eq!(events.len(), 5);

        assert_eq!(events[0].topic, topics::ROOM_CREATED);
        assert!(ack(&events[0]).success);

        assert_eq!(events[1].topic, topics::JOIN_RESULT);
        let join = ack(&events[1]);
        assert!(join.success);
        assert_eq!(join.room_id, "office-1");

        // Registration snapshot: player sits at the provider's spawn point.
        assert_eq!(events[2].topic, topics::room_players("office-1"));
        let snap = snapshot(&events[2]);
        let p = &snap.players["p1"];
        assert_eq!((p.x, p.y), (5.0, 6.0));
        assert_eq!(p.username, "alice");

        // Movement snapshot carries the full updated record.
        let snap = snapshot(&events[3]);
        let p = &snap.players["p1"];
        assert_eq!((p.x, p.y), (50.0, 75.0));
        assert_eq!(p.direction, Direction::Right);
        assert!(p.is_moving);
        assert_eq!(p.animation, "walk");
        assert_eq!(p.timestamp, 123);

        // Leave empties the room; subscribers get the empty mapping.
        let snap = snapshot(&events[4]);
        assert!(snap.players.is_empty());
    }

    // -----------------------------------------------------------------------
    // Acks for invalid / out-of-order commands
    // -----------------------------------------------------------------------

    #[test]
    fn create_with_empty_room_id_is_rejected() {
        let events = run_commands(vec![SessionCommand::CreateRoom(CreateRoomRequest {
            username: "alice".into(),
            room_id: String::new(),
        })]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, topics::ROOM_CREATED);
        let ack = ack(&events[0]);
        assert!(!ack.success);
        assert!(ack.message.is_some());
    }

    #[test]
    fn join_creates_missing_room() {
        let events = run_commands(vec![
            SessionCommand::JoinRoom(JoinRoomRequest {
                username: "bob".into(),
                room_id: "fresh".into(),
            }),
            SessionCommand::Register(Player::new("p1", "fresh", "bob")),
        ]);

        assert_eq!(events.len(), 2);
        assert!(ack(&events[0]).success);
        // The register went through, so the room really exists.
        assert_eq!(events[1].topic, topics::room_players("fresh"));
        assert_eq!(snapshot(&events[1]).players.len(), 1);
    }

    #[test]
    fn register_in_unknown_room_broadcasts_nothing() {
        let events = run_commands(vec![
            SessionCommand::Register(Player::new("p1", "ghost", "alice")),
            SessionCommand::Move(Player::new("p1", "ghost", "alice")),
        ]);
        assert!(events.is_empty());
    }

    #[test]
    fn leave_with_missing_ids_broadcasts_nothing() {
        let events = run_commands(vec![SessionCommand::LeaveRoom(LeaveRoomRequest {
            room_id: String::new(),
            player_id: String::new(),
        })]);
        assert!(events.is_empty());
    }

    // -----------------------------------------------------------------------
    // Command wire format
    // -----------------------------------------------------------------------

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let cmd: SessionCommand = serde_json::from_str(
            r#"{"type": "register", "id": "p1", "roomId": "r", "username": "alice"}"#,
        )
        .unwrap();
        match cmd {
            SessionCommand::Register(p) => {
                assert_eq!(p.id, "p1");
                assert_eq!(p.room_id, "r");
                // Omitted movement fields take their defaults.
                assert_eq!(p.direction, Direction::Down);
                assert!(!p.is_moving);
            }
            other => panic!("expected register, got {:?}", other),
        }

        let cmd: SessionCommand = serde_json::from_str(
            r#"{"type": "move", "id": "p1", "roomId": "r", "x": 5.0, "y": 7.0,
                "direction": "left", "isMoving": true, "animation": "walk",
                "timestamp": 9}"#,
        )
        .unwrap();
        match cmd {
            SessionCommand::Move(p) => {
                assert_eq!((p.x, p.y), (5.0, 7.0));
                assert_eq!(p.direction, Direction::Left);
                assert_eq!(p.timestamp, 9);
            }
            other => panic!("expected move, got {:?}", other),
        }
    }
}
