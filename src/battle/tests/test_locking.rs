use crate::battle::state::BattleStatus;
use crate::battle::tests::common::{create_runner_with, TestCreatureBuilder, YieldingBattleStore};
use crate::errors::ArenaError;
use crate::stores::{BattleStore, MemoryAccountStore, MemoryBattleStore, MemoryProgressStore};
use pretty_assertions::assert_eq;
use schema::{Creature, PokemonType, RecordId};

fn rattata() -> Creature {
    TestCreatureBuilder::new(19, "Rattata", &[PokemonType::Normal])
        .with_stats(30, 56, 35, 25, 35, 100)
        .build()
}

fn machop() -> Creature {
    TestCreatureBuilder::new(66, "Machop", &[PokemonType::Fighting])
        .with_stats(70, 80, 50, 35, 35, 80)
        .build()
}

const ROUND: [&str; 4] = [
    "Rattata (lvl=1, pwr=46) deals 1 dmg to Machop (rf=0.50)",
    "Computer's Machop is making a move!",
    "Machop (lvl=1, pwr=58) deals 2 dmg to Rattata (rf=0.50)",
    "It's now the player's turn.",
];

#[tokio::test]
async fn test_concurrent_actions_resolve_one_after_the_other() {
    let (runner, account) = create_runner_with(
        MemoryAccountStore::new(),
        MemoryProgressStore::new(),
        YieldingBattleStore {
            inner: MemoryBattleStore::new(),
        },
        vec![rattata(), machop()],
        vec![0.5; 4],
    )
    .await;
    let session = runner
        .create_battle(account, &RecordId::new("rec-019"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        runner.submit_action(session.id, "attack"),
        runner.submit_action(session.id, "attack"),
    );
    let mut lengths = vec![first.unwrap().log.len(), second.unwrap().log.len()];
    lengths.sort_unstable();
    assert_eq!(lengths, vec![6, 10]);

    let stored = runner.battles().get(session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BattleStatus::PlayerTurn);
    assert_eq!((stored.player.current_hp(), stored.computer.current_hp()), (26, 68));
    let expected: Vec<String> = ROUND
        .iter()
        .chain(ROUND.iter())
        .map(|line| line.to_string())
        .collect();
    assert_eq!(stored.log[2..].to_vec(), expected);
}

#[tokio::test]
async fn test_surrender_during_action_finishes_once() {
    let (runner, account) = create_runner_with(
        MemoryAccountStore::new(),
        MemoryProgressStore::new(),
        YieldingBattleStore {
            inner: MemoryBattleStore::new(),
        },
        vec![rattata(), machop()],
        vec![0.5; 2],
    )
    .await;
    let session = runner
        .create_battle(account, &RecordId::new("rec-019"))
        .await
        .unwrap();

    let (action, surrendered) = tokio::join!(
        runner.submit_action(session.id, "attack"),
        runner.surrender(session.id),
    );
    let surrendered = surrendered.unwrap();

    let stored = runner.battles().get(session.id).await.unwrap().unwrap();
    assert_eq!(stored, surrendered);
    assert_eq!(stored.status, BattleStatus::Finished);
    assert_eq!(stored.log.last().map(String::as_str), Some("Player surrendered!"));
    assert_eq!(
        stored.log.iter().filter(|line| *line == "Player surrendered!").count(),
        1
    );
    match action {
        Ok(played) => {
            assert_eq!(played.status, BattleStatus::PlayerTurn);
            assert_eq!(stored.log[2..6].to_vec(), ROUND.map(String::from).to_vec());
        }
        Err(err) => assert_eq!(err, ArenaError::BattleAlreadyFinished),
    }
}
