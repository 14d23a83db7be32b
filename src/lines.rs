//! Voice-line tables for zundamahjong's Zundamon opponent.

use crate::backends::Tuning;
use crate::batch::VoiceRequest;
use std::time::Duration;

/// What to check before generating a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheck {
    /// `GET /speakers` must succeed or the run stops.
    Required,
    /// `GET /version` is printed if available, a warning otherwise.
    Advisory,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Calls,
    Quotes,
    Retakes,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub kind: TableKind,
    pub default_out: &'static str,
    pub health: HealthCheck,
    pub write_manifest: bool,
    pub pause: Duration,
    pub requests: Vec<VoiceRequest>,
}

impl Table {
    pub fn load(kind: TableKind) -> Self {
        match kind {
            TableKind::Calls => Self {
                kind,
                default_out: "public/sounds/voice",
                health: HealthCheck::Required,
                write_manifest: false,
                pause: Duration::ZERO,
                requests: call_lines(),
            },
            TableKind::Quotes => Self {
                kind,
                default_out: "public/sounds/voice/quotes",
                health: HealthCheck::Advisory,
                write_manifest: true,
                pause: Duration::ZERO,
                requests: quote_lines(),
            },
            TableKind::Retakes => Self {
                kind,
                default_out: ".",
                health: HealthCheck::Skip,
                write_manifest: false,
                pause: Duration::from_millis(500),
                requests: retake_lines(),
            },
        }
    }
}

const CALLS: &[(&str, &str)] = &[
    ("zunda_pon.wav", "ポンなのだ！"),
    ("zunda_chi.wav", "チーなのだ。もらうのだ。"),
    ("zunda_kan.wav", "カァーン！"),
    ("zunda_riichi.wav", "リーチなのだ。覚悟するのだ。"),
    ("zunda_ron.wav", "ロン！弱い、弱すぎるのだｗ"),
    ("zunda_tsumo.wav", "ツモ！文句ないのだ！"),
    ("zunda_tenpai.wav", "そろそろ上がれそうなのだ…"),
    ("zunda_slow.wav", "遅いのだ。早く打つのだ。"),
    ("zunda_dora.wav", "おっ、ドラ切ったのだ？"),
    ("zunda_start.wav", "よろしくなのだ。絶対負けないのだ。"),
];

const QUOTES: &[(&str, &[&str])] = &[
    ("DEFENSE", &[
        "うわ、リーチなのだ…。統計的にここは『オリ』が正解なのだ。君のその安そうな手に振り込むほど、ボクは馬鹿じゃないのだ。",
        "はいはい撤退撤退。君のリーチ、なんか『待ち』が透けて見えるのだ。そんな見え見えの罠にかかるわけないのだ。",
    ]),
    ("OFFENSE", &[
        "は？ そのリーチ、ブラフでしょ？ 期待値計算した結果、ボクのこの手は『全ツッパ』が最適解と出たのだ！！",
        "リスクリターンも計算できないの？ このドラは通る……いや、通す！！ 君の運だけのリーチなんて怖くないのだ！！",
    ]),
    ("SAFE_TILE", &[
        "はいはい、安パイ。君のリーチ、全然プレッシャーないんだけど？",
        "はいはい、安全策安全策。そんなにボクのロンが怖いのだ？ ビビり散らかしてるのが手に取るようにわかるのだｗ",
    ]),
    ("EARLY_GAME", &[
        "ふふん、手牌が育ってきたのだ。今のうちに逃げる準備したほうがいいんじゃない？ 後で泣いても知らないのだ。",
        "ボクの配牌、良すぎて笑いが止まらないのだ。君の手牌、なんかゴミ溜めみたいになってない？",
    ]),
    ("DRAW_TENPAI", &[
        "危なかったねー。シミュレーションでは次のツモでボクが上がってたのだ。君の寿命が少し伸びただけなのだ。",
    ]),
    ("DRAW_NOTEN", &[
        "……あえてテンパイを取らなかったのだ。これが『回し打ち』の極意。放銃回避を最優先した高度な戦術……君には理解できない高尚なプレイなのだ。",
    ]),
    ("WIN_SMALL", &[
        "はい、ロン！ ……え、安い？ 点数じゃないのだ、君の『流れ』を断ち切るのが目的なのだ！ ざぁこ♡",
    ]),
    ("WIN_BIG", &[
        "これが実力、これが知性なのだ！！ 君の非効率な打牌に対する、統計学からの鉄槌なのだ！！ 点棒置いてさっさと席を立つのだ！",
    ]),
    ("GAME_WIN", &[
        "当然の結果なのだ。君とボクとでは、積んでるCPUのスペックが違いすぎたのだ。悔しかったら課金して出直してくるのだ！ まあ、何度やってもボクが勝つけどね！ お疲れ様、養分さん！",
    ]),
    ("PLAYER_WIN_LOW", &[
        "えっ、それだけ？ その点数のためにボクの手を蹴ったの？ コスパ悪すぎなのだ。",
        "必死にアガってそれ？ 駄菓子代にもならないのだｗ",
    ]),
    ("PLAYER_WIN_HIGH", &[
        "はいはい、よかったねー。すごいすごい（棒）。これで満足なのだ？",
        "へー、高打点？ おめでとうなのだ。……まさか、たかがゲームの点数で人生勝った気になってないよね？",
        "あーはいはい、強い強い。運だけは一人前なのだ。一応拍手してあげるのだ。（パチパチパチ）",
    ]),
    ("PLAYER_WIN_GENERIC", &[
        "はいはいおめでとう。君の人生の運、今ので全部使い果たしたのだw",
        "まあ、たまには勝たせてあげないとね。これは『接待』なのだ。",
    ]),
];

/// Category-wide prosody for the taunts aimed at a winning player.
fn quote_tuning(category: &str) -> Tuning {
    match category {
        "PLAYER_WIN_LOW" => Tuning {
            speed: Some(1.2),
            pitch: Some(0.1),
            intonation: None,
        },
        "PLAYER_WIN_HIGH" => Tuning::new(1.1, 0.0, 0.5),
        "PLAYER_WIN_GENERIC" => Tuning {
            speed: Some(1.3),
            pitch: None,
            intonation: Some(1.5),
        },
        _ => Tuning::NONE,
    }
}

// (file, text, speed, pitch, intonation)
const RETAKES: &[(&str, &str, f64, f64, f64)] = &[
    // "あんぜんさく" in hiragana so the engine does not misread 安全策
    (
        "SAFE_TILE_1.wav",
        "はいはい、あんぜんさく、あんぜんさく。そんなにボクのロンが怖いのだ？ ビビり散らかしてるのが手に取るようにわかるのだわら",
        1.2, 0.0, 1.2,
    ),
    (
        "WIN_SMALL_TSUMO_0.wav",
        "あがり。安い？ 関係ないのだ。早あがりで君の親番を流すのが、デジタル麻雀の基本なのだ。",
        1.1, 0.0, 1.1,
    ),
    (
        "GAME_WIN_1.wav",
        "圧倒的勝利なのだ！ 人類の知能なんて、所詮この程度なのだ。ボクに勝とうなんて100万年早かったね。",
        1.2, 0.1, 1.3,
    ),
    (
        "GAME_WIN_2.wav",
        "対戦ありがとうございましたー。君の打牌データ、いい学習サンプルになったよ。養分になってくれて感謝するのだ。",
        1.1, 0.0, 0.8,
    ),
];

pub fn call_lines() -> Vec<VoiceRequest> {
    CALLS
        .iter()
        .map(|(file, text)| VoiceRequest::new(*file, *text))
        .collect()
}

/// Quote files are named `<CATEGORY>_<index>.wav`.
pub fn quote_lines() -> Vec<VoiceRequest> {
    QUOTES
        .iter()
        .flat_map(|(category, lines)| {
            let tuning = quote_tuning(category);
            lines.iter().enumerate().map(move |(i, text)| {
                VoiceRequest::new(format!("{}_{}.wav", category, i), *text)
                    .in_category(*category)
                    .with_tuning(tuning)
            })
        })
        .collect()
}

pub fn retake_lines() -> Vec<VoiceRequest> {
    RETAKES
        .iter()
        .map(|(file, text, speed, pitch, intonation)| {
            VoiceRequest::new(*file, *text).with_tuning(Tuning::new(*speed, *pitch, *intonation))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_file_names_unique_per_table() {
        for kind in [TableKind::Calls, TableKind::Quotes, TableKind::Retakes] {
            let table = Table::load(kind);
            let names: HashSet<_> = table.requests.iter().map(|r| r.file_name.as_str()).collect();
            assert_eq!(names.len(), table.requests.len(), "{:?}", kind);
            assert!(table.requests.iter().all(|r| r.file_name.ends_with(".wav")));
        }
    }

    #[test]
    fn test_quote_naming_and_tuning() {
        let quotes = quote_lines();
        assert_eq!(quotes.len(), 20);

        let high: Vec<_> = quotes
            .iter()
            .filter(|r| r.category.as_deref() == Some("PLAYER_WIN_HIGH"))
            .collect();
        assert_eq!(high.len(), 3);
        assert_eq!(high[2].file_name, "PLAYER_WIN_HIGH_2.wav");
        assert_eq!(high[0].tuning, Tuning::new(1.1, 0.0, 0.5));

        let defense = &quotes[0];
        assert_eq!(defense.file_name, "DEFENSE_0.wav");
        assert!(defense.tuning.is_empty());
    }

    #[test]
    fn test_table_policies() {
        let calls = Table::load(TableKind::Calls);
        assert_eq!(calls.requests.len(), 10);
        assert_eq!(calls.health, HealthCheck::Required);
        assert!(!calls.write_manifest);

        let retakes = Table::load(TableKind::Retakes);
        assert_eq!(retakes.requests.len(), 4);
        assert_eq!(retakes.pause, Duration::from_millis(500));
        assert!(retakes.requests.iter().all(|r| !r.tuning.is_empty()));
    }
}
