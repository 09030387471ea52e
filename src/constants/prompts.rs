//! Prompt text sent to the generation backend. The backend is a plain
//! text-completion service, so every structured exchange spells out the
//! required JSON shape inline.

pub const IMAGE_CAPTION_PROMPT: &str = "This image is from a learning unit. \
Analyze it and provide a detailed explanation of its overall context, \
including the content and concepts conveyed in the image. Respond with the \
explanation only, within 50 words.";

pub fn build_quiz_prompt(mcq: i16, true_false: i16, corpus: &str) -> String {
    let total = mcq + true_false;
    format!(
        r#"You are an expert quiz creator. Based on the following content, generate a short quiz title (2-3 words) and exactly {total} quiz questions: {mcq} Multiple Choice questions and {true_false} True/False questions.

The output MUST be a valid JSON object with this format:
{{
  "title": "Short Title",
  "questions": [
    {{
      "question": "The question text",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
      "correctOption": 0,
      "questionType": "MULTIPLE_CHOICE"
    }}
  ]
}}

For True/False questions, the "options" array must be exactly ["True", "False"] and "questionType" must be "TRUE_FALSE".

Content:
---
{corpus}
---

Do not include any text outside of the JSON object."#
    )
}

pub fn build_video_transcript_prompt(video_id: &str, transcript: &str) -> String {
    format!(
        "I have a transcript from a YouTube video (ID: {video_id}). Please \
provide detailed textbook content that converts it into professional, formal \
expository prose, not conversational human speech.\n\nTRANSCRIPT:\n{transcript}\n\n\
Please give the paragraph of contents.\n\nOutput:\n\"TextBook Content: {{content}}\""
    )
}

pub fn build_video_url_prompt(video_id: &str, url: &str) -> String {
    format!(
        "I have a YouTube video with ID: {video_id} at URL: {url}. Please \
provide a detailed textbook-style content description of the video. If you \
don't have access to the video's detailed content, please clearly state that \
and then offer a general, formal description of what the video might cover \
based on its URL and context.\n\nOutput:\n\"TextBook Content: {{content}}\""
    )
}

pub fn build_video_window_transcript_prompt(video_id: &str, transcript: &str) -> String {
    format!(
        "I have a partial transcript from a YouTube video (ID: {video_id}). \
Please provide detailed textbook-style content covering the key points, main \
ideas, and important details from this video segment in formal, textbook-like \
language. Make it comprehensive but concise.\n\nTRANSCRIPT:\n{transcript}\n\n\
Output:\n\"TextBook Content: {{content}}\""
    )
}

pub fn build_video_window_url_prompt(
    video_id: &str,
    url: &str,
    start: Option<f64>,
    end: Option<f64>,
) -> String {
    let start = start
        .map(|s| s.to_string())
        .unwrap_or_else(|| "start".to_string());
    let end = end
        .map(|e| e.to_string())
        .unwrap_or_else(|| "end".to_string());
    format!(
        "Please provide a summary of the YouTube video segment with ID: \
{video_id} at URL: {url} from timestamp {start} to {end}. Focus on the main \
topics, key points, and overall content of this video segment. If you don't \
have access to the video's content, please state that and provide a general \
description of what the video might be about based on its URL.\n\n\
Output:\n\"TextBook Content: {{content}}\""
    )
}

pub fn build_feedback_prompt(
    questions_json: &str,
    answers_json: &str,
    score: i16,
    corpus_excerpt: &str,
) -> String {
    format!(
        r#"You are an expert educational feedback AI. Provide a highly structured, interactive, and visually engaging feedback report on a user's quiz attempt.

QUIZ QUESTIONS:
{questions_json}

USER ANSWERS:
{answers_json}

OVERALL SCORE: {score}

ORIGINAL CONTENT SUMMARY:
{corpus_excerpt}

Your output must be a single valid JSON object (no markdown, no code blocks, no commentary) with the following structure:

{{
  "overallFeedback": "[A concise, positive summary of the user's performance, referencing key strengths and areas for improvement.]",
  "questionFeedback": [
    {{
      "questionId": "[ID of the question]",
      "isCorrect": true,
      "explanation": "[Short, clear explanation for the answer. If incorrect, explain why and what is correct.]",
      "concept": "[The main concept or topic tested by this question.]"
    }}
  ],
  "recommendations": "[Actionable, encouraging recommendations for improvement. Reference specific concepts or areas within the original content summary.]",
  "graphData": {{
    "correct": 0,
    "incorrect": 0,
    "conceptBreakdown": [
      {{"concept": "[Concept Name]", "correct": 0, "incorrect": 0}}
    ]
  }},
  "interactive": {{
    "conceptExplanation": "[Pick one weak concept and explain it simply.]",
    "practiceQuestion": {{
      "question": "[A new question on the weak concept]",
      "options": ["A", "B", "C", "D"],
      "correctIndex": 0,
      "explanation": "[Short explanation of the correct answer]"
    }}
  }}
}}

DO NOT include any markdown, code blocks, or extra commentary. Output ONLY the JSON object."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_prompt_embeds_counts_and_corpus() {
        let prompt = build_quiz_prompt(3, 2, "the water cycle");

        assert!(prompt.contains("exactly 5 quiz questions"));
        assert!(prompt.contains("3 Multiple Choice"));
        assert!(prompt.contains("2 True/False"));
        assert!(prompt.contains("the water cycle"));
    }

    #[test]
    fn window_url_prompt_defaults_missing_bounds() {
        let prompt =
            build_video_window_url_prompt("abc123def45", "https://example.com", None, Some(30.0));

        assert!(prompt.contains("from timestamp start to 30"));
    }

    #[test]
    fn feedback_prompt_embeds_all_inputs() {
        let prompt = build_feedback_prompt("[questions]", "[answers]", 50, "corpus text");

        assert!(prompt.contains("[questions]"));
        assert!(prompt.contains("[answers]"));
        assert!(prompt.contains("OVERALL SCORE: 50"));
        assert!(prompt.contains("corpus text"));
        assert!(prompt.contains("overallFeedback"));
    }
}
