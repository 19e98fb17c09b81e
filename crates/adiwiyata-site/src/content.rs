//! Fixed page copy.

use serde::Serialize;

pub const DEFAULT_VIDEO_ID: &str = "yOb9Xaug35M";

#[derive(Debug, Clone, Serialize)]
pub struct Hero {
    pub image: &'static str,
    pub alt: &'static str,
}

pub static HERO: Hero = Hero {
    image: "home.png",
    alt: "Home cover",
};

/// One accordion entry. `bullets` render as a list under the answer.
#[derive(Debug, Clone, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
    pub bullets: &'static [&'static str],
}

/// Split into the two accordion columns at this index.
pub const FAQ_COLUMN_SPLIT: usize = 3;

pub static FAQ: [FaqEntry; 6] = [
    FaqEntry {
        question: "Apa itu Program Adiwiyata?",
        answer: "Adiwiyata adalah program sekolah berwawasan lingkungan yang bertujuan \
                 menciptakan warga sekolah peduli dan berbudaya lingkungan. Program ini \
                 menjadikan sekolah sebagai tempat belajar yang ramah, sehat, dan \
                 berkelanjutan.",
        bullets: &[],
    },
    FaqEntry {
        question: "Mengapa Adiwiyata Penting?",
        answer: "Karena melalui Adiwiyata, siswa tidak hanya belajar di kelas, tetapi \
                 juga belajar bagaimana menjaga alam, mengelola sampah, dan menggunakan \
                 sumber daya secara bijak. Tujuannya agar terbentuk generasi yang peduli \
                 bumi.",
        bullets: &[],
    },
    FaqEntry {
        question: "Apa peran siswa dalam program Adiwiyata?",
        answer: "Siswa diharapkan aktif menjaga kebersihan lingkungan sekolah, ikut serta \
                 dalam kegiatan penghijauan, mengurangi sampah plastik, serta menjadi \
                 agen perubahan dalam gaya hidup ramah lingkungan.",
        bullets: &[],
    },
    FaqEntry {
        question: "Apa sih benefit yang didapatkan dari program Adiwiyata?",
        answer: "Dengan ikut serta dalam Adiwiyata, sekolah dan siswa dapat merasakan \
                 banyak benefit, antara lain:",
        bullets: &[
            "Sekolah jadi lebih bersih, sehat, dan hijau.",
            "Siswa terbiasa disiplin dalam menjaga kebersihan dan lingkungan.",
            "Meningkatkan citra sekolah sebagai sekolah peduli lingkungan.",
            "Memupuk rasa tanggung jawab generasi muda terhadap bumi.",
            "Memberi pengalaman nyata tentang gaya hidup berkelanjutan.",
        ],
    },
    FaqEntry {
        question: "Apa manfaat Adiwiyata bagi sekolah?",
        answer: "Sekolah menjadi lebih hijau, bersih, sehat, dan nyaman. Selain itu, \
                 sekolah juga membentuk karakter siswa yang disiplin, bertanggung jawab, \
                 dan peduli terhadap lingkungan.",
        bullets: &[],
    },
    FaqEntry {
        question: "Bagaimana cara berpartisipasi?",
        answer: "Setiap siswa, guru, maupun warga sekolah bisa ikut berpartisipasi dengan \
                 hal-hal sederhana seperti hemat energi, menanam pohon, hingga ikut serta \
                 dalam program lingkungan yang diadakan di sekolah.",
        bullets: &[],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct VideoSection {
    pub title: &'static str,
    pub description: &'static str,
    pub embed_url: String,
}

impl VideoSection {
    pub fn new(video_id: &str) -> Self {
        Self {
            title: "Dokumentasi",
            description: "Berikut adalah dokumentasi kegiatan Adiwiyata yang telah \
                          dilaksanakan. Silakan tonton video di bawah ini untuk melihat \
                          lebih detail tentang kegiatan tersebut.",
            embed_url: embed_url(video_id),
        }
    }
}

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

/// Copy for the chat panel and the comment board.
#[derive(Debug, Clone, Serialize)]
pub struct PanelCopy {
    pub bot_name: &'static str,
    pub bot_tagline: &'static str,
    pub welcome_title: &'static str,
    pub welcome_body: &'static str,
    pub typing: &'static str,
    pub chat_placeholder: &'static str,
    pub comments_title: &'static str,
    pub comments_subtitle: &'static str,
    pub comments_empty: &'static str,
    pub comment_author: &'static str,
    pub comment_placeholder: &'static str,
    pub comment_submit: &'static str,
}

pub static PANEL: PanelCopy = PanelCopy {
    bot_name: "AdiBot",
    bot_tagline: "Asisten Digital Program Adiwiyata",
    welcome_title: "Selamat datang di AdiBot! 👋",
    welcome_body: "Saya siap membantu Anda dengan pertanyaan seputar program Adiwiyata, \
                   pengelolaan lingkungan sekolah, bank sampah, dan kegiatan ramah \
                   lingkungan lainnya.",
    typing: "AdiBot sedang mengetik",
    chat_placeholder: "Tanyakan tentang Adiwiyata...",
    comments_title: "Berikan Tanggapan Anda",
    comments_subtitle: "Mengenai Program Adiwiyata",
    comments_empty: "Belum ada komentar. Jadilah yang pertama!",
    comment_author: "Anonim",
    comment_placeholder: "Ketik pesan...",
    comment_submit: "Kirim",
};
