//! Prompt templates for the two generation steps.

use crate::models::{Keywords, Location};

pub fn keywords_prompt(title: &str, location: &Location) -> String {
    let Location { city, country } = location;
    format!(
        r#"As an SEO expert, generate a list of 10-15 relevant keywords and phrases for an article with the title: "{title}" that would be relevant for readers in {city}, {country}.

The keywords should:
1. Include a mix of short-tail and long-tail keywords
2. Be relevant to the topic and location ({city}, {country})
3. Have search volume potential in the target location
4. Include some question-based keywords if applicable
5. Consider local search intent for {city} and {country}

Format the response as a comma-separated list of keywords.
Keep it concise and focused on the most relevant keywords only."#
    )
}

pub fn article_prompt(title: &str, keywords: &Keywords, location: &Location) -> String {
    let Location { city, country } = location;
    format!(
        r##"Consider yourself an experienced blogger living in {city}, {country}. Write a concise article titled "{title}."

Keywords:
{keywords}

Structure:
Introduction: Capture attention with a brief engaging opening related to the topic.
Main Points: Cover 2-3 key aspects of the topic with clear explanations.
Conclusion: Summarize key takeaways and offer a brief call to action.

Additional Notes:
- Use a casual, conversational tone throughout the article.
- Emphasize your experience and expertise as a blogger from {city}, {country}.
- Write in a clear, concise style that is easy to read and understand.
- Format the article in proper HTML with h1, h2 tags, paragraph tags, and other HTML formatting.
- Make sure the h1 tag contains the exact title of the article: {title}
- Where it helps the reader, link between sections with in-page anchors (<a href="#section-id">).
- Where an image would help, leave an HTML comment such as <!-- image: short description -->.
- Keep the article between 500-800 words for this initial version."##
    )
}
