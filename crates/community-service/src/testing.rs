//! In-memory repositories and a pre-wired `ServiceContext` for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use community_common::{AlertsConfig, Environment};
use community_core::{
    AlertChannelKind, AuditLogEntry, AuditLogFilter, AuditLogRepository, AuditResult, AuditStats,
    CountedKey, DomainError, Group, GroupRepository, MemberRole, Membership, MembershipRepository,
    Message, MessageRepository, ModerationLog, ModerationLogRepository, ModerationScope,
    MuteRepository, Notification, NotificationPreferences, NotificationRepository, Post,
    PostRepository, RepoResult, Room, RoomRepository, Snowflake, SnowflakeGenerator, User,
    UserMute, UserRepository,
};
use parking_lot::Mutex;

use crate::alerting::{AlertChannel, AlertDispatcher, AlertError, AlertPayload};
use crate::services::{ServiceContext, ServiceSettings};

fn injected(what: &str) -> DomainError {
    DomainError::DatabaseError(format!("injected {what} failure"))
}

// ============================================================================
// Users, rooms, groups, memberships, content
// ============================================================================

#[derive(Default)]
pub struct MemUsers {
    rows: Mutex<HashMap<Snowflake, User>>,
    fail_reads: AtomicBool,
    reads: AtomicUsize,
}

impl MemUsers {
    pub fn put(&self, user: User) {
        self.rows.lock().insert(user.id, user);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of `find_by_id` calls so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for MemUsers {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseUnavailable("injected read failure".into()));
        }
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        self.put(user.clone());
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: Snowflake,
        preferences: &NotificationPreferences,
    ) -> RepoResult<()> {
        match self.rows.lock().get_mut(&id) {
            Some(user) => {
                user.set_preferences(*preferences);
                Ok(())
            }
            None => Err(DomainError::UserNotFound(id)),
        }
    }
}

#[derive(Default)]
pub struct MemRooms(Mutex<HashMap<Snowflake, Room>>);

#[async_trait]
impl RoomRepository for MemRooms {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        Ok(self.0.lock().get(&id).cloned())
    }

    async fn create(&self, room: &Room) -> RepoResult<()> {
        self.0.lock().insert(room.id, room.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemGroups(Mutex<HashMap<Snowflake, Group>>);

#[async_trait]
impl GroupRepository for MemGroups {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Group>> {
        Ok(self.0.lock().get(&id).cloned())
    }

    async fn create(&self, group: &Group) -> RepoResult<()> {
        self.0.lock().insert(group.id, group.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemMemberships(Mutex<HashMap<(ModerationScope, Snowflake), Membership>>);

#[async_trait]
impl MembershipRepository for MemMemberships {
    async fn find(
        &self,
        scope: ModerationScope,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        Ok(self.0.lock().get(&(scope, user_id)).cloned())
    }

    async fn create(&self, membership: &Membership) -> RepoResult<()> {
        let key = (membership.scope, membership.user_id);
        let mut rows = self.0.lock();
        if rows.contains_key(&key) {
            return Err(DomainError::AlreadyMember(membership.scope));
        }
        rows.insert(key, membership.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemPosts(Mutex<HashMap<Snowflake, Post>>);

#[async_trait]
impl PostRepository for MemPosts {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        Ok(self.0.lock().get(&id).cloned())
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        self.0.lock().insert(post.id, post.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemMessages(Mutex<HashMap<Snowflake, Message>>);

#[async_trait]
impl MessageRepository for MemMessages {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.0.lock().get(&id).cloned())
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.0.lock().insert(message.id, message.clone());
        Ok(())
    }
}

// ============================================================================
// Moderation logs and mutes
// ============================================================================

#[derive(Default)]
pub struct MemModerationLogs(Mutex<Vec<ModerationLog>>);

impl MemModerationLogs {
    pub fn all(&self) -> Vec<ModerationLog> {
        self.0.lock().clone()
    }
}

#[async_trait]
impl ModerationLogRepository for MemModerationLogs {
    async fn append(&self, log: &ModerationLog) -> RepoResult<()> {
        self.0.lock().push(log.clone());
        Ok(())
    }

    async fn find_by_target(
        &self,
        target_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationLog>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .0
            .lock()
            .iter()
            .rev()
            .filter(|log| log.target_id == target_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemMutes(Mutex<Vec<UserMute>>);

impl MemMutes {
    pub fn all(&self) -> Vec<UserMute> {
        self.0.lock().clone()
    }

    pub fn put(&self, mute: UserMute) {
        self.0.lock().push(mute);
    }
}

#[async_trait]
impl MuteRepository for MemMutes {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserMute>> {
        Ok(self.0.lock().iter().find(|m| m.id == id).cloned())
    }

    async fn find_active(
        &self,
        user_id: Snowflake,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<UserMute>> {
        Ok(self
            .0
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id && m.scope == scope && m.expires_at > at)
            .max_by_key(|m| m.expires_at)
            .cloned())
    }

    async fn find_active_by_scope(
        &self,
        scope: ModerationScope,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<UserMute>> {
        let mut active: Vec<UserMute> = self
            .0
            .lock()
            .iter()
            .filter(|m| m.scope == scope && m.expires_at > at)
            .cloned()
            .collect();
        active.sort_by_key(|m| m.expires_at);
        Ok(active)
    }

    async fn create(&self, mute: &UserMute) -> RepoResult<()> {
        self.put(mute.clone());
        Ok(())
    }

    async fn extend(&self, mute: &UserMute) -> RepoResult<()> {
        let mut rows = self.0.lock();
        let row = rows
            .iter_mut()
            .find(|m| m.id == mute.id)
            .ok_or(DomainError::MuteNotFound(mute.id))?;
        row.expires_at = mute.expires_at;
        row.muted_by = mute.muted_by;
        row.reason = mute.reason.clone();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.0.lock();
        let before = rows.len();
        rows.retain(|m| m.id != id);
        Ok(rows.len() != before)
    }
}

// ============================================================================
// Audit log
// ============================================================================

#[derive(Default)]
pub struct MemAuditLog {
    rows: Mutex<Vec<AuditLogEntry>>,
    fail_writes: AtomicBool,
}

impl MemAuditLog {
    /// Entries in insertion order
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.rows.lock().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writes(&self) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("audit write"));
        }
        Ok(())
    }
}

fn matches(entry: &AuditLogEntry, filter: &AuditLogFilter) -> bool {
    filter.user_id.map_or(true, |id| entry.user_id == Some(id))
        && filter.action.as_ref().map_or(true, |a| &entry.action == a)
        && filter.resource.as_ref().map_or(true, |r| &entry.resource == r)
        && filter.result.map_or(true, |r| entry.result == r)
        && filter.start_date.map_or(true, |s| entry.timestamp >= s)
        && filter.end_date.map_or(true, |e| entry.timestamp <= e)
}

fn top(counts: HashMap<String, i64>) -> Vec<CountedKey> {
    let mut keys: Vec<CountedKey> = counts
        .into_iter()
        .map(|(key, count)| CountedKey { key, count })
        .collect();
    keys.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    keys.truncate(10);
    keys
}

#[async_trait]
impl AuditLogRepository for MemAuditLog {
    async fn append(&self, entry: &AuditLogEntry) -> RepoResult<()> {
        self.check_writes()?;
        self.rows.lock().push(entry.clone());
        Ok(())
    }

    async fn query(&self, filter: &AuditLogFilter) -> RepoResult<(Vec<AuditLogEntry>, i64)> {
        let matching: Vec<AuditLogEntry> = self
            .rows
            .lock()
            .iter()
            .rev()
            .filter(|e| matches(e, filter))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let offset = usize::try_from(filter.offset()).unwrap_or(0);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn stats(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepoResult<AuditStats> {
        let filter = AuditLogFilter {
            start_date: start,
            end_date: end,
            ..AuditLogFilter::default()
        };
        let rows = self.rows.lock();
        let window: Vec<&AuditLogEntry> = rows.iter().filter(|e| matches(e, &filter)).collect();

        let mut actions = HashMap::new();
        let mut resources = HashMap::new();
        let mut users = std::collections::HashSet::new();
        for entry in &window {
            *actions.entry(entry.action.clone()).or_insert(0) += 1;
            *resources.entry(entry.resource.clone()).or_insert(0) += 1;
            if let Some(user_id) = entry.user_id {
                users.insert(user_id);
            }
        }
        let success = window
            .iter()
            .filter(|e| e.result == AuditResult::Success)
            .count() as i64;

        Ok(AuditStats {
            total: window.len() as i64,
            success,
            failure: window.len() as i64 - success,
            unique_users: users.len() as i64,
            top_actions: top(actions),
            top_resources: top(resources),
        })
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        self.check_writes()?;
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|e| e.timestamp >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Default)]
pub struct MemNotifications {
    rows: Mutex<Vec<Notification>>,
    fail_writes: AtomicBool,
}

impl MemNotifications {
    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationRepository for MemNotifications {
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("notification write"));
        }
        self.rows.lock().push(notification.clone());
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Snowflake,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Notification>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count_unread(&self, user_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn mark_read(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|n| n.id == id && n.user_id == user_id) {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut changed = 0;
        for n in self.rows.lock().iter_mut() {
            if n.user_id == user_id && !n.read {
                n.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(rows.len() != before)
    }

    async fn delete_all(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|n| n.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Alert channel double
// ============================================================================

pub struct MockChannel {
    kind: AlertChannelKind,
    fail: bool,
    payloads: Mutex<Vec<AlertPayload>>,
}

impl MockChannel {
    pub fn ok(kind: AlertChannelKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            fail: false,
            payloads: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(kind: AlertChannelKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            fail: true,
            payloads: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().len()
    }

    pub fn payloads(&self) -> Vec<AlertPayload> {
        self.payloads.lock().clone()
    }
}

#[async_trait]
impl AlertChannel for MockChannel {
    fn kind(&self) -> AlertChannelKind {
        self.kind
    }

    async fn send(&self, payload: &AlertPayload, _config: &AlertsConfig) -> Result<(), AlertError> {
        self.payloads.lock().push(payload.clone());
        if self.fail {
            return Err(AlertError::Status(503));
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestHarness {
    pub ctx: ServiceContext,
    pub users: Arc<MemUsers>,
    pub rooms: Arc<MemRooms>,
    pub groups: Arc<MemGroups>,
    pub memberships: Arc<MemMemberships>,
    pub posts: Arc<MemPosts>,
    pub messages: Arc<MemMessages>,
    pub moderation_logs: Arc<MemModerationLogs>,
    pub mutes: Arc<MemMutes>,
    pub audit: Arc<MemAuditLog>,
    pub notifications: Arc<MemNotifications>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(
            AlertDispatcher::new(AlertsConfig::default(), Environment::Development),
            ServiceSettings::default(),
        )
    }

    pub fn with_fail_open(fail_open: bool) -> Self {
        Self::build(
            AlertDispatcher::new(AlertsConfig::default(), Environment::Development),
            ServiceSettings {
                preference_fail_open: fail_open,
                ..ServiceSettings::default()
            },
        )
    }

    /// Harness whose dispatcher delivers to the given doubles
    pub fn with_alerts(config: AlertsConfig, channels: Vec<Arc<MockChannel>>) -> Self {
        let dispatcher = channels
            .into_iter()
            .fold(AlertDispatcher::new(config, Environment::Development), |d, c| {
                d.with_channel(c)
            });
        Self::build(dispatcher, ServiceSettings::default())
    }

    fn build(dispatcher: AlertDispatcher, settings: ServiceSettings) -> Self {
        let users = Arc::new(MemUsers::default());
        let rooms = Arc::new(MemRooms::default());
        let groups = Arc::new(MemGroups::default());
        let memberships = Arc::new(MemMemberships::default());
        let posts = Arc::new(MemPosts::default());
        let messages = Arc::new(MemMessages::default());
        let moderation_logs = Arc::new(MemModerationLogs::default());
        let mutes = Arc::new(MemMutes::default());
        let audit = Arc::new(MemAuditLog::default());
        let notifications = Arc::new(MemNotifications::default());

        let ctx = ServiceContext::builder()
            .user_repo(users.clone())
            .room_repo(rooms.clone())
            .group_repo(groups.clone())
            .membership_repo(memberships.clone())
            .post_repo(posts.clone())
            .message_repo(messages.clone())
            .moderation_log_repo(moderation_logs.clone())
            .mute_repo(mutes.clone())
            .audit_log_repo(audit.clone())
            .notification_repo(notifications.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .alerts(Arc::new(dispatcher))
            .settings(settings)
            .build()
            .expect("all dependencies wired");

        Self {
            ctx,
            users,
            rooms,
            groups,
            memberships,
            posts,
            messages,
            moderation_logs,
            mutes,
            audit,
            notifications,
        }
    }

    pub fn user(&self, name: &str) -> User {
        let user = User::new(
            self.ctx.generate_id(),
            name.to_string(),
            format!("{name}@example.com"),
        );
        self.users.put(user.clone());
        user
    }

    pub fn room(&self, name: &str) -> Room {
        let room = Room::new(self.ctx.generate_id(), name.to_string(), Snowflake::new(1));
        self.rooms.0.lock().insert(room.id, room.clone());
        room
    }

    pub fn group(&self, name: &str) -> Group {
        let group = Group::new(self.ctx.generate_id(), name.to_string(), Snowflake::new(1));
        self.groups.0.lock().insert(group.id, group.clone());
        group
    }

    pub fn join(&self, scope: ModerationScope, user_id: Snowflake, role: MemberRole) {
        let membership = Membership::new(scope, user_id, role);
        self.memberships
            .0
            .lock()
            .insert((scope, user_id), membership);
    }

    pub fn post(&self, group_id: Option<Snowflake>, author_id: Snowflake, title: &str) -> Post {
        let post = Post {
            id: self.ctx.generate_id(),
            group_id,
            author_id,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        self.posts.0.lock().insert(post.id, post.clone());
        post
    }

    pub fn message(
        &self,
        room_id: Option<Snowflake>,
        group_id: Option<Snowflake>,
        author_id: Snowflake,
        content: &str,
    ) -> Message {
        let message = Message {
            id: self.ctx.generate_id(),
            room_id,
            group_id,
            author_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.messages.0.lock().insert(message.id, message.clone());
        message
    }
}
