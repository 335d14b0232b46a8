//! Membership Index
//!
//! トピックとメンバー（クライアント ID）の双方向インデックス。
//!
//! ## ロック順序
//!
//! 両方向を同時に更新する操作は、必ず `topic_members` のエントリを握ったまま
//! `member_topics` を更新する。逆順でロックする操作は存在しないため、
//! シャード単位のロックでもデッドロックしない。
//! 読み出しは片方のマップだけを短時間ロックし、スナップショットを返す。

use std::collections::{BTreeMap, HashSet};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{ClientId, Topic};

/// トピック ↔ メンバーの双方向インデックス
#[derive(Debug, Default)]
pub struct MembershipIndex {
    /// Key: topic, Value: そのトピックのメンバー
    topic_members: DashMap<Topic, HashSet<ClientId>>,
    /// Key: member, Value: そのメンバーが属するトピック
    member_topics: DashMap<ClientId, HashSet<Topic>>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// メンバーをトピックに追加する（冪等）
    ///
    /// 新たに追加された場合は `true`、既にメンバーだった場合は `false` を返す。
    pub fn add_member(&self, topic: &Topic, member: &ClientId) -> bool {
        let mut members = self.topic_members.entry(topic.clone()).or_default();
        let inserted = members.insert(member.clone());
        self.member_topics
            .entry(member.clone())
            .or_default()
            .insert(topic.clone());
        if inserted {
            tracing::debug!("Added '{}' to topic '{}'", member, topic);
        }
        inserted
    }

    /// メンバーをトピックから外す（冪等）
    ///
    /// 空になったトピック、どのトピックにも属さなくなったメンバーは削除する。
    pub fn remove_member(&self, topic: &Topic, member: &ClientId) -> bool {
        let Entry::Occupied(mut members) = self.topic_members.entry(topic.clone()) else {
            return false;
        };
        let removed = members.get_mut().remove(member);

        if let Entry::Occupied(mut topics) = self.member_topics.entry(member.clone()) {
            topics.get_mut().remove(topic);
            if topics.get().is_empty() {
                topics.remove();
            }
        }

        if members.get().is_empty() {
            members.remove();
            tracing::debug!("Topic '{}' is empty and was removed", topic);
        }
        if removed {
            tracing::debug!("Removed '{}' from topic '{}'", member, topic);
        }
        removed
    }

    /// トピックごと削除し、削除時点のメンバーを返す
    pub fn remove_topic(&self, topic: &Topic) -> HashSet<ClientId> {
        let Entry::Occupied(members) = self.topic_members.entry(topic.clone()) else {
            return HashSet::new();
        };

        for member in members.get() {
            if let Entry::Occupied(mut topics) = self.member_topics.entry(member.clone()) {
                topics.get_mut().remove(topic);
                if topics.get().is_empty() {
                    topics.remove();
                }
            }
        }

        let evicted = members.remove();
        tracing::debug!("Evicted topic '{}' ({} members)", topic, evicted.len());
        evicted
    }

    /// メンバーを全トピックから外し、外したトピックを返す
    pub fn remove_member_everywhere(&self, member: &ClientId) -> HashSet<Topic> {
        let topics = self.topics_of(member);
        topics
            .into_iter()
            .filter(|topic| self.remove_member(topic, member))
            .collect()
    }

    /// トピックのメンバーのスナップショット
    pub fn members_of(&self, topic: &Topic) -> HashSet<ClientId> {
        self.topic_members
            .get(topic)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    /// メンバーが属するトピックのスナップショット
    pub fn topics_of(&self, member: &ClientId) -> HashSet<Topic> {
        self.member_topics
            .get(member)
            .map(|topics| topics.clone())
            .unwrap_or_default()
    }

    pub fn is_member(&self, topic: &Topic, member: &ClientId) -> bool {
        self.topic_members
            .get(topic)
            .is_some_and(|members| members.contains(member))
    }

    /// 全トピックとメンバーのスナップショット（デバッグ用、ソート済み）
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.topic_members
            .iter()
            .map(|entry| {
                let mut members: Vec<String> = entry
                    .value()
                    .iter()
                    .map(|member| member.as_str().to_string())
                    .collect();
                members.sort();
                (entry.key().as_str().to_string(), members)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::GameId;

    fn client(id: &str) -> ClientId {
        ClientId::new(id.to_string()).unwrap()
    }

    fn game_topic(id: &str) -> Topic {
        Topic::game(&GameId::new(id.to_string()).unwrap())
    }

    #[test]
    fn test_add_member_updates_both_views() {
        // テスト項目: 追加するとトピック側とメンバー側の両方に反映される
        // given (前提条件):
        let index = MembershipIndex::new();
        let topic = game_topic("g1");
        let alice = client("alice");

        // when (操作):
        let inserted = index.add_member(&topic, &alice);

        // then (期待する結果):
        assert!(inserted);
        assert!(index.members_of(&topic).contains(&alice));
        assert!(index.topics_of(&alice).contains(&topic));
    }

    #[test]
    fn test_add_member_twice_is_noop() {
        // テスト項目: 同じメンバーを 2 回追加しても 1 件のまま
        // given (前提条件):
        let index = MembershipIndex::new();
        let topic = Topic::lobby();
        let alice = client("alice");
        index.add_member(&topic, &alice);

        // when (操作):
        let inserted_again = index.add_member(&topic, &alice);

        // then (期待する結果):
        assert!(!inserted_again);
        assert_eq!(index.members_of(&topic).len(), 1);
        assert_eq!(index.topics_of(&alice).len(), 1);
    }

    #[test]
    fn test_add_then_remove_leaves_no_trace() {
        // テスト項目: 追加してから削除すると、両方向とも元の状態に戻る
        // given (前提条件):
        let index = MembershipIndex::new();
        let topic = game_topic("g1");
        let alice = client("alice");

        // when (操作):
        index.add_member(&topic, &alice);
        let removed = index.remove_member(&topic, &alice);

        // then (期待する結果):
        assert!(removed);
        assert!(index.members_of(&topic).is_empty());
        assert!(index.topics_of(&alice).is_empty());
        assert!(index.snapshot().is_empty());
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        // テスト項目: メンバーでないクライアントの削除はエラーにならず何もしない
        // given (前提条件):
        let index = MembershipIndex::new();
        let topic = Topic::lobby();
        index.add_member(&topic, &client("alice"));

        // when (操作):
        let removed = index.remove_member(&topic, &client("bob"));
        let removed_unknown_topic = index.remove_member(&game_topic("nope"), &client("alice"));

        // then (期待する結果):
        assert!(!removed);
        assert!(!removed_unknown_topic);
        assert_eq!(index.members_of(&topic).len(), 1);
    }

    #[test]
    fn test_remove_topic_evicts_from_member_view() {
        // テスト項目: トピック削除で、各メンバーの所属からもそのトピックが消える
        // given (前提条件):
        let index = MembershipIndex::new();
        let game = game_topic("g1");
        let lobby = Topic::lobby();
        let alice = client("alice");
        let bob = client("bob");
        index.add_member(&game, &alice);
        index.add_member(&game, &bob);
        index.add_member(&lobby, &alice);

        // when (操作):
        let evicted = index.remove_topic(&game);

        // then (期待する結果):
        assert_eq!(evicted.len(), 2);
        assert!(index.members_of(&game).is_empty());
        assert_eq!(index.topics_of(&alice), HashSet::from([lobby]));
        assert!(index.topics_of(&bob).is_empty());
    }

    #[test]
    fn test_remove_member_everywhere() {
        // テスト項目: メンバーを全トピックから一括で外せる
        // given (前提条件):
        let index = MembershipIndex::new();
        let alice = client("alice");
        index.add_member(&Topic::lobby(), &alice);
        index.add_member(&game_topic("g1"), &alice);
        index.add_member(&game_topic("g1"), &client("bob"));

        // when (操作):
        let left = index.remove_member_everywhere(&alice);

        // then (期待する結果):
        assert_eq!(left.len(), 2);
        assert!(index.topics_of(&alice).is_empty());
        assert!(!index.is_member(&game_topic("g1"), &alice));
        assert!(index.is_member(&game_topic("g1"), &client("bob")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_and_remove_keep_views_consistent() {
        // テスト項目: 並行に追加・削除しても両方向のビューが一致する
        // given (前提条件):
        let index = Arc::new(MembershipIndex::new());
        let topics: Vec<Topic> = (0..4).map(|i| game_topic(&format!("g{i}"))).collect();

        // when (操作):
        let mut handles = Vec::new();
        for worker in 0..8 {
            let index = index.clone();
            let topics = topics.clone();
            handles.push(tokio::spawn(async move {
                for round in 0..200 {
                    let member = client(&format!("m{}", (worker + round) % 10));
                    let topic = &topics[round % topics.len()];
                    if round % 3 == 0 {
                        index.remove_member(topic, &member);
                    } else {
                        index.add_member(topic, &member);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        for (topic_name, members) in index.snapshot() {
            let topic = topics.iter().find(|t| t.as_str() == topic_name).unwrap();
            for member in members {
                assert!(index.topics_of(&client(&member)).contains(topic));
            }
        }
        for i in 0..10 {
            let member = client(&format!("m{i}"));
            for topic in index.topics_of(&member) {
                assert!(index.is_member(&topic, &member));
            }
        }
    }
}
