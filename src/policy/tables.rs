use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

/// Every canned string the policy layer can emit, loaded once at engine
/// construction. Content edits never touch selection logic.
#[derive(Debug, Clone)]
pub struct ReplyTables {
    /// Closed media-type mapping: reel, sticker, gif, image, video,
    /// audio, voice, call, video_call.
    pub media_replies: BTreeMap<String, Vec<String>>,
    /// Single generic reply for media types outside the mapping.
    pub unknown_media_reply: String,
    /// Fixed reply for an empty or whitespace-only message.
    pub empty_message_reply: String,
    /// Pool drawn from when no candidate clears the acceptance threshold.
    pub default_pool: Vec<String>,
    /// Characters the blending policy splits stored responses on.
    pub emoji_delimiters: Vec<char>,
    /// Emojis the blending policy appends to a synthesized reply.
    pub blend_emojis: Vec<String>,
}

impl ReplyTables {
    /// Uniform draw from the pool for `media_type`, or the generic reply
    /// when the type is unmapped or its pool is empty.
    pub fn media_reply<R: Rng + ?Sized>(&self, media_type: &str, rng: &mut R) -> String {
        self.media_replies
            .get(media_type)
            .and_then(|pool| pool.choose(rng))
            .cloned()
            .unwrap_or_else(|| self.unknown_media_reply.clone())
    }

    /// Uniform draw from the default pool. Falls back to the generic
    /// media reply only if the pool was configured empty.
    pub fn default_reply<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.default_pool
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| self.unknown_media_reply.clone())
    }
}

impl Default for ReplyTables {
    fn default() -> Self {
        let mut media_replies = BTreeMap::new();
        media_replies.insert(
            "reel".to_string(),
            vec![
                "nice reel, seen it already 💀".to_string(),
                "not watching another reel 😭".to_string(),
            ],
        );
        media_replies.insert(
            "sticker".to_string(),
            vec![
                "a sticker? really 💔".to_string(),
                "stickers don't count as conversation 😭".to_string(),
            ],
        );
        media_replies.insert(
            "gif".to_string(),
            vec![
                "cool gif I guess 💀".to_string(),
                "gif received, unimpressed 🥀".to_string(),
            ],
        );
        media_replies.insert(
            "image".to_string(),
            vec![
                "saw the pic 🥀".to_string(),
                "blurry pic but ok 💀".to_string(),
            ],
        );
        media_replies.insert(
            "video".to_string(),
            vec![
                "watched the video, riveting stuff ☠️".to_string(),
                "long video, skipped to the end 💔".to_string(),
            ],
        );
        media_replies.insert(
            "audio".to_string(),
            vec![
                "heard the track 🥀".to_string(),
                "song was fine 💀".to_string(),
            ],
        );
        media_replies.insert(
            "voice".to_string(),
            vec![
                "listened to the voice note ☠️".to_string(),
                "voice note was too long 💔".to_string(),
            ],
        );
        media_replies.insert(
            "call".to_string(),
            vec![
                "can't pick up right now 💀".to_string(),
                "missed your call, oops 🥀".to_string(),
            ],
        );
        media_replies.insert(
            "video_call".to_string(),
            vec![
                "no video calls today 😭".to_string(),
                "camera is staying off ☠️".to_string(),
            ],
        );

        Self {
            media_replies,
            unknown_media_reply: "saw it 💀".to_string(),
            empty_message_reply: "you sent me an empty message 💀".to_string(),
            default_pool: vec![
                "what do you even want 🥀".to_string(),
                "busy right now, try later ☠️".to_string(),
                "leave me alone for a bit 💔".to_string(),
                "not dealing with this today 💀".to_string(),
                "go bother someone else 🤣".to_string(),
                "nobody cares, honestly ☠️".to_string(),
            ],
            // U+FE0F is the emoji variation selector; splitting on it too
            // keeps it out of the surviving fragments.
            emoji_delimiters: vec!['💀', '🥀', '☠', '\u{fe0f}', '😭', '🤣', '💔', '🙏'],
            blend_emojis: vec![
                "💀".to_string(),
                "🥀".to_string(),
                "☠️".to_string(),
                "😭".to_string(),
                "🤣".to_string(),
                "💔".to_string(),
                "🙏".to_string(),
            ],
        }
    }
}
