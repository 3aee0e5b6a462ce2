//! Prompt templates for LLM interactions.
//!
//! Templates are in Japanese because the records and the expected answers
//! are. The response formats they ask for are what `evaluate::parse` and
//! `tagger` read back.

use super::provider::{Prompt, PromptKind};

const CARE_PROFESSIONAL_PREAMBLE: &str = "あなたは，優秀な care professionalです．さまざまな介護記録情報に対して，記録情報の内容を解釈することをサポートしてください．";

const ICF_ABSTRACTION_RULES: &str = r#"1. "身体構造（body structures）", "心身機能（body functions）", "活動（activity）", "参加（participation）"， "環境因子（environmental factors）"， "個人因子（personal factors）"に関連させて，inputされた情報を抽象化してその特徴を表現してください．
2. 「身体構造」のように抽象化しすぎてはいけません．Examplesを参考にして，必ずabstractionタグを付与してください．
3. 支援者視点(second-person view)ではなく個人視点(first-person view)で回答してください．例えば，「協力が得られない」等の表現は支援者の視点からの抽象化です．どういう参加・活動の能力があるのか/ないのか，どんな身体的・精神的・心理的機能があるのか/ないのか，どんな環境に置かれているのかを表してください．
4. 精神症状，介護アセスメント情報，パーソナル情報は，以下の項目を参照し，病名は（身体構造）としてキーワードをabstractionに含めてください．"#;

const ICF_ABSTRACTION_STYLE: &str = r#"6. 出力結果は40文字以内で回答してください．
7. 出力結果は一貫した回答を常に生成してください．
8. 回答は日本でお願いします．
9. 指示された出力形式に厳密に従ってください.
10. 解釈や要点, 対応ポイントなど指示されてないものは一切回答しないでください."#;

const ICF_ABSTRACTION_EXAMPLES: &str = r#"Examples:
input:馴染みの人に相談できる，abstraction:（対人関係）相談できる知り合いが周りにいるという環境要因がある,
input:階段60段登れていた, abstraction:（歩行）昇り降りして移動する身体的な能力がある,
input:知り合いのボランティアとは笑顔で会話可能, abstraction:（参加）周囲の人と基本的なコミュニケーションに参加することができる,
input:当初声掛けが必要だったトイレ動作は自立できた, abstraction:（排泄）排泄の計画と遂行を自立的に活動することが可能,
input:運動の誘いを拒否, abstraction:（運動）モチベーションが低くく活力が低下している,
input:包括支援センターの介入, abstraction:（介護保険）健康的なライフスタイルを促進することに関するサービス,
input:周囲への関心低下, abstraction:（対人関係）対人的技能の形成につながる精神機能,
input:セルフケアは声掛け必要,abstraction:（活動）セルフケア全般のレベル
input:アルツハイマー病の診断あり,abstraction:（身体構造）脳機能に障害がある
input:熱いお風呂が好き,abstraction:（嗜好）熱いお風呂が好き

精神症状（ICFの心身機能）：
不安，抑うつ，幻覚，妄想，不眠，食欲不振，過眠，不眠，途中覚醒，早朝覚醒，多動，不潔行為，暴言，徘徊，暴力，衝動，焦燥感，いらいら，不穏，躁状態，帰宅願望，意欲の低下，無気力

介護アセスメント情報（ICFの活動）：
食事，排泄，入浴，更衣，整容，歩行，移乗，立位，座位，寝返り，トイレ動作

基本情報（ICFの参加，環境因子）：
家族構成，職歴，病歴，生活歴，病名，飲酒，喫煙，家事，対人関係

パーソナル情報（ICFの個人因子）：
趣味，性格・気質・人格，習慣，嗜好，身だしなみ，色の好み，好きなメディア，なじみのもの，得意なこと，苦手なこと，好む話，好まない話，信仰，尊敬する人，動物の好き嫌い，健康法"#;

fn prompt(kind: PromptKind, input: &str, text: String) -> Prompt {
    Prompt {
        kind,
        input: input.to_string(),
        text,
    }
}

/// Build a prompt extracting the resident's own words from a care-log entry.
pub fn speech_prompt(input: &str) -> Prompt {
    let text = format!(
        r#"{CARE_PROFESSIONAL_PREAMBLE}

[Instructions]
1. 利用者の発言に関する情報に[発言」というTagを付与してください．
2. Tagを付与する対象は利用者（対象者）の発言だけにしてください．
3. 利用者の発言がない場合は「該当なし」と回答してください．
4. Tag一つにつき，一つの回答を生成してください．
5. 利用者の発話は"「"や"『"で始まり，"」"や"』"で終わる文章です．
6. 指示された出力形式に厳密に従ってください.
7. 解釈や要点, 対応ポイントなど指示されてないものは一切回答しないでください.

[Input]{input}"#
    );
    prompt(PromptKind::Speech, input, text)
}

/// Build a prompt tagging personal traits expressed in the resident's speech.
///
/// Expected answer lines: `output: (tag) summary`.
pub fn personality_prompt(input: &str) -> Prompt {
    let text = format!(
        r#"{CARE_PROFESSIONAL_PREAMBLE}

[Instructions]
1. inputされた情報を，以下のTagの項目に関連する情報をextractしてください．
2. extractされた情報にTagを付与し，その内容を要約してください．
3. extractする情報は利用者（対象者）の発言だけにしてください．
4. extractできる利用者の発言がない場合は「該当なし」と回答し，Tagは選択しないでください．
5. extractされた情報から分類できるTagがない場合は，「該当なし」と回答してください．
6. Tag一つにつき，一つの回答を生成してください．
7. 出力結果はExampleを例に一貫した回答を常に生成してください．
8. 解釈や要点, 対応ポイントなど指示されてないものは一切回答しないでください.
9. 指示された出力形式に厳密に従ってください.
10. あなたの応答は、必ず "output: " という接頭辞から始めてください。

[Expamples]
input:昔畑で野菜を作っていたそうで、野菜をじっくり眺めている, extract:畑で野菜を作っていた, output: (趣味)「野菜を作っていた」とのことで野菜作りが趣味であった
input:棚の建て付けを見て、「これ直してやろうか」とのこと, extract:棚の建て付けを見て、「これ直してやろうか」, output: (得意なこと)「これ直してやろうか」との発言があり棚の建て付けが得意である

[Tag]
趣味，嗜好，好きなもの，好きなこと，嫌いなもの，嫌いなこと，身だしなみ，色の好み，好きなメディア，なじみのもの，得意なこと，苦手なこと，好む話，好まない話，信仰，尊敬する人，動物の好き嫌い

[Input]{input}"#
    );
    prompt(PromptKind::Personality, input, text)
}

/// Build a prompt abstracting a care-log entry into ICF-oriented statements.
///
/// Expected answer lines: `abstraction: (category) statement`, or
/// `abstraction: 該当なし` when nothing applies.
pub fn icf_abstraction_prompt(input: &str) -> Prompt {
    let text = format!(
        r#"{CARE_PROFESSIONAL_PREAMBLE}

Instructions:
{ICF_ABSTRACTION_RULES}

{ICF_ABSTRACTION_STYLE}

{ICF_ABSTRACTION_EXAMPLES}

Input: {input}

[Output Format]
あなたの応答は、必ず "abstraction: " という接頭辞から始めてください。
複数の抽象化が可能な場合は、それぞれ改行して "abstraction: " から始めてください。
抽象化する内容がない場合は、"abstraction: 該当なし" とだけ応答してください。

abstraction: (抽象化された内容1)
abstraction: (抽象化された内容2)
"#
    );
    prompt(PromptKind::IcfAbstraction, input, text)
}

/// Build a prompt abstracting one care-plan clause.
pub fn careplan_abstraction_prompt(input: &str) -> Prompt {
    let text = format!(
        r#"あなたは，優秀な care professionalです．さまざまな介護ケアプランに対して，ケアプランの内容を解釈することをサポートしてください．

Instructions:
{ICF_ABSTRACTION_RULES}
5. 入力された情報には，①，②のようにナンバリングされた情報が含まれています。それぞれの番号ごとに分けて、個別にabstractionタグを付与して生成してください。
{ICF_ABSTRACTION_STYLE}

{ICF_ABSTRACTION_EXAMPLES}

Input: {input}"#
    );
    prompt(PromptKind::CareplanAbstraction, input, text)
}

/// Build a prompt scoring the emotion distribution of a care-log entry.
///
/// The answer ends with `summative:positive|negative|neutral`.
pub fn emotion_prompt(input: &str) -> Prompt {
    let text = format!(
        r#"あなたは感情分析の専門家です。inputされた文章に対して感情を評価してください．

Instruction:
1. inputの文章に対して、それぞれの形成的な評価として，感情（喜び，感謝，安らぎ，愛，興味，愉快，希望，悲しみ，驚き，怒り，嫌悪，恐怖，軽蔑，ニュートラル）を評価し，総括的評価（summative）として，ポジティブ，ネガティブ，ニュートラルに分類してください．
2. Exampleと同様の形式で出力してください．
3. 感情は，joy,thankfulness,relaxation,love,interest,pleasure,hope,sadness,surprise,anger,disgust,fear,contempt,neutralの13種類の感情の割合を計算し，それぞれの感情が文章に対してどの程度の割合を占めるかを示してください．
4. 感情の評価は，例えば，joy：0.2，sadness：0.1，のように評価し，合計が1.0になるようにしてください．
5. 感情の評価結果に基づき，文章の総合的な感情をポジティブ，ネガティブ，ニュートラルのいずれかに分類してください．
6. 出力結果はExampleを例に一貫した回答を常に生成し，一つの感情を生成してください．
7. 指示された出力形式に厳密に従ってください.
8. 解釈や要点, 対応ポイントなど指示されてないものは一切回答しないでください.

Example:
input:あの、お化粧しないと鏡見ないからね。しんどいときはね、ほんと姿見ないときあるんですよ。でも娘たちの存在が大きいですよ, emotion:joy：0.0，thankfulness：0.0，relaxation：0.0，love：0.0，interest：0.0，pleasure：0.0，hope：0.4，sadness：0.6，surprise：0.0，anger：0.0，disgust：0.0，fear：0.0，contempt：0.0，neutral：0.0, summative:negative
input:隣の席の石川さんと談笑していた, emotion:joy：1.0，thankfulness：0.0，relaxation：0.0，love：0.0，interest：0.0，pleasure：0.0，hope：0.0，sadness：0.0，surprise：0.0，anger：0.0，disgust：0.0，fear：0.0，contempt：0.0，neutral：0.0, summative:positive

Input: {input}"#
    );
    prompt(PromptKind::Emotion, input, text)
}

/// Build a prompt assigning one ICF code to an abstraction, given retrieved
/// reference snippets as context.
pub fn icf_labeling_prompt(context: &str, sentence: &str) -> Prompt {
    let text = format!(
        r#"あなたは，ICF(International Classification of Functioning, Disability and Health)の優秀なアノテータです．さまざまな介護記録情報に対して，ICFコードをアノテーション（タグづけ）することをサポートしてください．

Instructions:
1. ICFコードを回答してください.
2. ICFコードは基本的に３桁（例えばd570, e310）で回答してください．
3. 尤も当てはまる「一つのコード」に分類してください．
4. Contextの情報を参考に最も適切なICFコードを特定してください．
5. 出力結果は，ICFコードのみで，一貫した回答を常に生成してください．
6. 解説、前置き、会話的な文章は一切含めないでください.
7. 指示された出力形式に厳密に従ってください.
8. 解釈や要点, 対応ポイントなど指示されてないものは一切回答しないでください.

Context: {context}

Sentence: {sentence}"#
    );
    prompt(PromptKind::IcfLabeling, sentence, text)
}
