//! # 共通値オブジェクト
//!
//! 複数のエンティティで共有される値オブジェクトを定義する。
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`UserName`] | `String` | ユーザー表示名 |
//! | [`ImageName`] | `String` | 画像ストレージ上のオブジェクト名 |

define_validated_string! {
    /// ユーザー表示名（値オブジェクト）
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 最大 100 文字
    pub struct UserName {
        label: "ユーザー名",
        max_length: 100,
    }
}

define_validated_string! {
    /// 画像名（値オブジェクト）
    ///
    /// 画像コンテナ内のオブジェクトキー。パス引数からそのまま受け取る。
    pub struct ImageName {
        label: "画像 ID",
        max_length: 1024,
    }
}
